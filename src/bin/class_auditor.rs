use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use java_class_auditor::{audit_source, Severity};

/// Audit one Java source file and print the findings as JSON.
#[derive(Parser, Debug)]
#[command(name = "class-auditor", version, about)]
struct Args {
    /// Java source file to analyze (e.g. decompiler output)
    file: PathBuf,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Drop findings below this severity (low, medium, high, critical)
    #[arg(long, value_name = "SEVERITY")]
    min_severity: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let mut report = audit_source(&source)
        .with_context(|| format!("analysis of {} failed", args.file.display()))?;

    if let Some(label) = &args.min_severity {
        // Unknown labels degrade to Low, i.e. no filtering
        let floor = Severity::from_label(label);
        report.optimizations.retain(|f| f.severity >= floor);
        report.security.retain(|f| f.severity >= floor);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

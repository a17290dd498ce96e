use java_class_auditor::{audit_source, AnalysisError, Severity};

// Modeled on the kind of service class a decompiler hands back.
const VULNERABLE_SERVICE: &str = r#"class UserService {
    private String dbPassword = "Pr0duction#Pass";
    private Connection connection;

    void findUser(Statement stmt, String userId) {
        stmt.executeQuery("SELECT * FROM users WHERE id = " + userId);
    }

    void runTool(String cmd) {
        Runtime.getRuntime().exec(cmd);
    }

    String buildListing(String[] names) {
        String result = "";
        for (int i = 0; i < names.length; i++) {
            result = result + names[i];
        }
        return result;
    }

    void cleanup() {
        try {
            connection.close();
        } catch (Exception e) {
        }
    }
}"#;

#[test]
fn vulnerable_service_yields_findings_of_both_kinds() {
    let report = audit_source(VULNERABLE_SERVICE).unwrap();
    assert_eq!(report.class_name.as_deref(), Some("UserService"));
    assert!(!report.optimizations.is_empty(), "expected optimization findings");
    assert!(!report.security.is_empty(), "expected security findings");
    assert!(!report.heatmap.line_scores.is_empty());
}

#[test]
fn rerunning_the_pipeline_is_byte_identical() {
    let first = audit_source(VULNERABLE_SERVICE).unwrap();
    let second = audit_source(VULNERABLE_SERVICE).unwrap();
    assert_eq!(first, second, "pipeline must be deterministic");

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

#[test]
fn finding_lines_stay_within_the_source() {
    let report = audit_source(VULNERABLE_SERVICE).unwrap();
    let line_count = VULNERABLE_SERVICE.lines().count();
    for finding in &report.optimizations {
        assert!(finding.line >= 1 && finding.line <= line_count, "line {}", finding.line);
    }
    for finding in &report.security {
        assert!(finding.line >= 1 && finding.line <= line_count, "line {}", finding.line);
        assert!(matches!(
            finding.severity,
            Severity::Low | Severity::Medium | Severity::High | Severity::Critical
        ));
    }
}

#[test]
fn blank_source_fails_fast() {
    assert!(matches!(audit_source(""), Err(AnalysisError::EmptySource)));
    assert!(matches!(audit_source("   \n\t "), Err(AnalysisError::EmptySource)));
}

#[test]
fn classless_source_is_not_analyzable() {
    assert!(matches!(
        audit_source("int x = 1;"),
        Err(AnalysisError::NoAnalyzableInput)
    ));
}

#[test]
fn enum_units_are_accepted() {
    let report = audit_source("enum Color { RED, GREEN }");
    assert!(report.is_ok(), "an enum is still an analyzable unit");
}

#[test]
fn report_serializes_with_screaming_type_codes() {
    let report = audit_source(VULNERABLE_SERVICE).unwrap();
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"SQL_INJECTION\""));
    assert!(json.contains("\"STRING_CONCATENATION_IN_LOOP\""));
    assert!(json.contains("\"CRITICAL\""));
}

#[test]
fn source_read_from_disk_round_trips() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(VULNERABLE_SERVICE.as_bytes()).unwrap();

    let source = std::fs::read_to_string(file.path()).unwrap();
    let from_disk = audit_source(&source).unwrap();
    let in_memory = audit_source(VULNERABLE_SERVICE).unwrap();
    assert_eq!(from_disk, in_memory);
}

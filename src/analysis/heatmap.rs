/// Quality scoring and heat-region merging.
///
/// Findings join lines, methods, and classes purely by line-number
/// containment; scores are computed once after all findings for the class
/// are collected, then contiguous score-stable runs of lines are merged
/// into heat regions for visualization.
use std::collections::BTreeMap;

use serde::Serialize;
use tree_sitter::Node;

use crate::analysis::ast::complexity::{analyze_complexity, ComplexityFacts};
use crate::analysis::ast::structure::{collect_outline, ClassMetrics, ClassOutline, MethodMetrics};
use crate::analysis::findings::{OptimizationFinding, SecurityFinding, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    Optimization,
    Security,
}

/// A finding flattened to what scoring needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeIssue {
    pub line: usize,
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeatBand {
    Excellent,
    Good,
    Average,
    Poor,
    Critical,
}

/// A contiguous run of at least three score-adjacent lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRegion {
    pub start_line: usize,
    pub end_line: usize,
    pub quality_score: f64,
    pub heat_intensity: f64,
    pub band: HeatBand,
}

impl HeatmapRegion {
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// All scoring output for one compilation unit.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct HeatmapData {
    pub class_metrics: Vec<ClassMetrics>,
    pub method_metrics: Vec<MethodMetrics>,
    pub method_complexity: BTreeMap<String, u32>,
    pub issue_distribution: BTreeMap<usize, Vec<CodeIssue>>,
    pub line_complexity: BTreeMap<usize, u32>,
    pub line_scores: BTreeMap<usize, f64>,
    pub method_scores: BTreeMap<String, f64>,
    pub class_scores: BTreeMap<String, f64>,
    pub regions: Vec<HeatmapRegion>,
}

impl HeatmapData {
    /// Mean of the line scores; a clean class scores 100.
    pub fn overall_quality_score(&self) -> f64 {
        if self.line_scores.is_empty() {
            return 100.0;
        }
        self.line_scores.values().sum::<f64>() / self.line_scores.len() as f64
    }

    pub fn total_issue_count(&self) -> usize {
        self.issue_distribution.values().map(Vec::len).sum()
    }

    pub fn critical_issue_count(&self) -> usize {
        self.issue_distribution
            .values()
            .flatten()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }

    pub fn line_complexity(&self, line: usize) -> u32 {
        self.line_complexity.get(&line).copied().unwrap_or(0)
    }
}

pub struct HeatmapAnalyzer;

impl HeatmapAnalyzer {
    /// Build the full heatmap for one unit from its findings.
    pub fn generate(
        root: Node,
        source: &str,
        optimizations: &[OptimizationFinding],
        security: &[SecurityFinding],
    ) -> HeatmapData {
        let outline = collect_outline(root, source);
        let complexity = analyze_complexity(root, source);
        Self::generate_with_facts(outline, complexity, optimizations, security)
    }

    /// Scoring core, separated so tests can drive it with synthetic facts.
    pub fn generate_with_facts(
        outline: ClassOutline,
        complexity: ComplexityFacts,
        optimizations: &[OptimizationFinding],
        security: &[SecurityFinding],
    ) -> HeatmapData {
        let mut data = HeatmapData {
            class_metrics: outline.classes,
            method_metrics: outline.methods,
            method_complexity: complexity.method_complexity,
            line_complexity: complexity.line_decision_points,
            ..HeatmapData::default()
        };

        for opt in optimizations {
            data.issue_distribution
                .entry(opt.line)
                .or_default()
                .push(CodeIssue {
                    line: opt.line,
                    kind: IssueKind::Optimization,
                    severity: opt.severity,
                    description: opt.description.clone(),
                });
        }
        for sec in security {
            data.issue_distribution
                .entry(sec.line)
                .or_default()
                .push(CodeIssue {
                    line: sec.line,
                    kind: IssueKind::Security,
                    severity: sec.severity,
                    description: sec.description.clone(),
                });
        }

        for (&line, issues) in &data.issue_distribution {
            let score = line_quality_score(issues, data.line_complexity(line));
            data.line_scores.insert(line, score);
        }

        for method in &data.method_metrics {
            let cyclomatic = data
                .method_complexity
                .get(&method.method_name)
                .copied()
                .unwrap_or(1);
            let score = method_quality_score(method, cyclomatic, &data.line_scores);
            data.method_scores.insert(method.method_name.clone(), score);
        }

        for class in &data.class_metrics {
            let score = class_quality_score(class, &data.method_scores);
            data.class_scores.insert(class.class_name.clone(), score);
        }

        data.regions = merge_regions(&data.line_scores);
        tracing::debug!(
            lines = data.line_scores.len(),
            regions = data.regions.len(),
            "heatmap generated"
        );
        data
    }
}

/// Per-line score: 100 minus severity deductions (plus a flat extra for
/// security findings) minus a capped complexity penalty, clamped to 0..100.
fn line_quality_score(issues: &[CodeIssue], decision_points: u32) -> f64 {
    let mut score = 100.0;
    for issue in issues {
        score -= match issue.severity {
            Severity::Critical => 40.0,
            Severity::High => 25.0,
            Severity::Medium => 15.0,
            Severity::Low => 5.0,
        };
        if issue.kind == IssueKind::Security {
            score -= 10.0;
        }
    }
    score -= (f64::from(decision_points) * 2.0).min(20.0);
    score.clamp(0.0, 100.0)
}

/// Per-method score: average of the scored lines in range (100 when none),
/// minus capped complexity and length penalties, clamped to 0..100.
fn method_quality_score(
    method: &MethodMetrics,
    cyclomatic: u32,
    line_scores: &BTreeMap<usize, f64>,
) -> f64 {
    let mut total = 0.0;
    let mut scored_lines = 0usize;
    for (&line, &score) in line_scores.range(method.start_line..=method.end_line) {
        debug_assert!(method.contains_line(line));
        total += score;
        scored_lines += 1;
    }
    let mut average = if scored_lines > 0 {
        total / scored_lines as f64
    } else {
        100.0
    };
    average -= (f64::from(cyclomatic) * 3.0).min(30.0);
    average -= ((method.end_line - method.start_line) as f64 * 0.5).min(20.0);
    average.clamp(0.0, 100.0)
}

/// Per-class score: average of its scored methods (100 when none), minus
/// capped field-count and method-count penalties, clamped to 0..100.
fn class_quality_score(class: &ClassMetrics, method_scores: &BTreeMap<String, f64>) -> f64 {
    let mut total = 0.0;
    let mut scored = 0usize;
    for name in &class.method_names {
        if let Some(score) = method_scores.get(name) {
            total += score;
            scored += 1;
        }
    }
    let mut average = if scored > 0 { total / scored as f64 } else { 100.0 };
    average -= (class.field_count as f64 * 2.0).min(20.0);
    average -= (class.method_count as f64).min(15.0);
    average.clamp(0.0, 100.0)
}

/// Merge scored lines into maximal runs that are line-adjacent (gap <= 2)
/// and score-adjacent (within 20 of the running regional average). Runs
/// shorter than three lines are dropped, not emitted as regions.
pub fn merge_regions(line_scores: &BTreeMap<usize, f64>) -> Vec<HeatmapRegion> {
    let mut regions = Vec::new();
    let mut start: Option<usize> = None;
    let mut previous_line = 0usize;
    let mut running_average = 0.0;
    let mut size = 0usize;

    let close = |start: usize, end: usize, average: f64, size: usize, out: &mut Vec<HeatmapRegion>| {
        if size >= 3 {
            out.push(HeatmapRegion {
                start_line: start,
                end_line: end,
                quality_score: average,
                heat_intensity: heat_intensity(average),
                band: band_for(average),
            });
        }
    };

    for (&line, &score) in line_scores {
        match start {
            None => {
                start = Some(line);
                running_average = score;
                size = 1;
            }
            Some(region_start) => {
                if line - previous_line <= 2 && (score - running_average).abs() <= 20.0 {
                    running_average =
                        (running_average * size as f64 + score) / (size as f64 + 1.0);
                    size += 1;
                } else {
                    close(region_start, previous_line, running_average, size, &mut regions);
                    start = Some(line);
                    running_average = score;
                    size = 1;
                }
            }
        }
        previous_line = line;
    }
    if let Some(region_start) = start {
        close(region_start, previous_line, running_average, size, &mut regions);
    }
    regions
}

fn heat_intensity(score: f64) -> f64 {
    if score >= 80.0 {
        0.2
    } else if score >= 60.0 {
        0.4
    } else if score >= 40.0 {
        0.6
    } else if score >= 20.0 {
        0.8
    } else {
        1.0
    }
}

fn band_for(score: f64) -> HeatBand {
    if score >= 80.0 {
        HeatBand::Excellent
    } else if score >= 60.0 {
        HeatBand::Good
    } else if score >= 40.0 {
        HeatBand::Average
    } else if score >= 20.0 {
        HeatBand::Poor
    } else {
        HeatBand::Critical
    }
}

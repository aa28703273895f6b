use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::NondeterminismSummary;

const TABLE_HEADER: &str =
    "Table values are reported as percent nondeterministic of total runs.\n\n";
const COLUMN_HEADER: &str = "Column values are reported as percent nondeterministic of all table nondeterminism occurrences.\n\n";

/// Render the plain-text frequency report.
pub fn render_text_report(summary: &NondeterminismSummary) -> String {
    let mut out = String::new();
    out.push_str(TABLE_HEADER);
    out.push_str(COLUMN_HEADER);
    if summary.is_clean() {
        out.push_str("No nondeterminism found.\n");
        return out;
    }
    for table in &summary.tables {
        let _ = writeln!(out, "{} {:.2}", table.table, table.frequency);
        for column in &table.columns {
            let _ = writeln!(out, "  {} {:.2}", column.column, column.frequency);
        }
    }
    out
}

pub fn write_text_report(path: &Path, summary: &NondeterminismSummary) -> Result<()> {
    std::fs::write(path, render_text_report(summary))
        .with_context(|| format!("write {:?}", path))?;
    Ok(())
}

/// Machine-readable report artifact.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub workers: usize,
    pub duration_ms: u64,
    pub summary: NondeterminismSummary,
}

impl AnalysisReport {
    pub fn new(summary: NondeterminismSummary, workers: usize, duration_ms: u64) -> Self {
        Self {
            schema_version: "1".to_string(),
            generated_at: Utc::now(),
            workers,
            duration_ms,
            summary,
        }
    }
}

pub fn write_json_report(path: &Path, report: &AnalysisReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize analysis report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{ColumnFrequency, TableFrequency};

    fn summary() -> NondeterminismSummary {
        NondeterminismSummary {
            iterations: 4,
            skipped: 0,
            tables: vec![TableFrequency {
                table: "Resources".to_string(),
                frequency: 0.5,
                columns: vec![ColumnFrequency {
                    column: "Quantity".to_string(),
                    frequency: 1.0,
                }],
            }],
        }
    }

    #[test]
    fn test_render_clean_report() {
        let clean = NondeterminismSummary {
            iterations: 3,
            skipped: 0,
            tables: vec![],
        };
        let text = render_text_report(&clean);
        assert!(text.starts_with(TABLE_HEADER));
        assert!(text.ends_with("No nondeterminism found.\n"));
    }

    #[test]
    fn test_render_frequencies() {
        let text = render_text_report(&summary());
        let body = text
            .strip_prefix(TABLE_HEADER)
            .and_then(|t| t.strip_prefix(COLUMN_HEADER))
            .unwrap();
        assert_eq!(body, "Resources 0.50\n  Quantity 1.00\n");
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let text_path = dir.path().join("report");
        let json_path = dir.path().join("report.json");

        write_text_report(&text_path, &summary()).unwrap();
        write_json_report(&json_path, &AnalysisReport::new(summary(), 2, 10)).unwrap();

        let text = std::fs::read_to_string(&text_path).unwrap();
        assert!(text.contains("Resources 0.50"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["workers"], 2);
        assert_eq!(json["summary"]["tables"][0]["table"], "Resources");
        assert!(json["generated_at"].is_string());
    }
}

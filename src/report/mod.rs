//! Report aggregation: persisted JSON plus the console summary.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::{compare::ComparisonResult, printer::SummaryPrinter};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub comparisons: Vec<ComparisonResult>,
}

impl Report {
    pub fn new(comparisons: Vec<ComparisonResult>) -> Self {
        Self { comparisons }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Overwrite `path` with the full report.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating report directory {}", dir.display()))?;
        }
        fs::write(path, self.to_json()?).with_context(|| format!("writing report {}", path.display()))?;
        info!(path = %path.display(), entries = self.comparisons.len(), "report written");
        Ok(())
    }

    pub fn summary_line(result: &ComparisonResult, printer: &SummaryPrinter) -> String {
        let status = &result.outcome.status;
        let status_part = if status.is_ok() {
            String::new()
        } else {
            format!(" status={}", printer.status(status.label()))
        };
        format!(
            "Q{}: verdict={}{}; expected={:?}; actual={:?}",
            result.id,
            printer.verdict(result.verdict),
            status_part,
            result.expected,
            result.actual
        )
    }

    /// One line per example, then the report location.
    pub fn print_summary<W: Write>(&self, out: &mut W, report_path: &Path, printer: &SummaryPrinter) -> io::Result<()> {
        for result in &self.comparisons {
            writeln!(out, "{}", Self::summary_line(result, printer))?;
        }
        writeln!(out, "Full report saved to: {}", printer.path(&report_path.display().to_string()))?;
        out.flush()
    }

    pub fn needs_attention(&self) -> usize {
        self.comparisons.iter().filter(|c| c.needs_attention()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bank::ExampleId,
        execution::{ExecutionOutcome, OutcomeStatus},
    };

    fn sample() -> Report {
        Report::new(vec![
            ComparisonResult::new(
                "7",
                ExecutionOutcome {
                    id: ExampleId::Number(1),
                    status: OutcomeStatus::Ok { stdout: "7".into(), stderr: String::new() },
                },
            ),
            ComparisonResult::new(
                "输出值",
                ExecutionOutcome {
                    id: ExampleId::Number(2),
                    status: OutcomeStatus::CompileError { compile_stderr: "error: expected ';'".into() },
                },
            ),
        ])
    }

    #[test]
    fn json_keeps_order_and_non_ascii() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("输出值"));
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = v["comparisons"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["id"], 1);
        assert_eq!(items[0]["verdict"], "match");
        assert_eq!(items[0]["outcome"]["status"], "ok");
        assert_eq!(items[1]["id"], 2);
        assert_eq!(items[1]["outcome"]["status"], "compile_error");
        assert_eq!(items[1]["nonzero_exit"], false);
    }

    #[test]
    fn summary_has_one_line_per_example_plus_path() {
        let mut out = Vec::new();
        let printer = SummaryPrinter { color: false };
        sample().print_summary(&mut out, Path::new("/tmp/r.json"), &printer).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Q1: verdict=match; expected=\"7\"; actual=\"7\"");
        assert_eq!(lines[1], "Q2: verdict=mismatch status=compile_error; expected=\"输出值\"; actual=\"\"");
        assert_eq!(lines[2], "Full report saved to: /tmp/r.json");
    }

    #[test]
    fn write_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("verify_results.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale content that is much longer than nothing").unwrap();
        let empty = Report::default();
        empty.write(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"comparisons\": []\n}\n");
        assert_eq!(sample().needs_attention(), 1);
    }
}

//! Console painting for the summary (owo-colors).

use owo_colors::OwoColorize;

use crate::compare::Verdict;

#[derive(Debug, Clone, Copy)]
pub struct SummaryPrinter {
    pub color: bool,
}

impl SummaryPrinter {
    pub fn verdict(&self, verdict: Verdict) -> String {
        let text = verdict.label();
        if !self.color {
            return text.to_string();
        }
        match verdict {
            Verdict::Match => format!("{}", text.green()),
            Verdict::Mismatch => format!("{}", text.red()),
            Verdict::NoExpected => format!("{}", text.yellow()),
        }
    }

    pub fn status(&self, status: &str) -> String {
        if self.color {
            format!("{}", status.magenta())
        } else {
            status.to_string()
        }
    }

    pub fn path(&self, path: &str) -> String {
        if self.color {
            format!("{}", path.cyan())
        } else {
            path.to_string()
        }
    }
}

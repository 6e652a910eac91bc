//! Expected-output markers embedded in example source.
//!
//! A marker is a label such as `输出` or `Output` directly followed by `:` or
//! `：`. The expected output is the rest of that line, trimmed.

pub const DEFAULT_LABELS: &[&str] = &["预期输出", "输出结果", "运行结果", "输出", "expected output", "output"];

const COLONS: &[char] = &[':', '：'];

#[derive(Debug, Clone)]
pub struct MarkerSet {
    // longest first
    labels: Vec<String>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()))
    }
}

impl MarkerSet {
    pub fn new<I: IntoIterator<Item = String>>(labels: I) -> Self {
        let mut labels: Vec<String> = labels.into_iter().filter(|l| !l.trim().is_empty()).collect();
        labels.sort_by(|a, b| b.len().cmp(&a.len()));
        labels.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        Self { labels }
    }

    /// Default labels plus `extra`.
    pub fn with_extra(extra: &[String]) -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()).chain(extra.iter().cloned()))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Expected output declared in `source`, or `""` when there is none.
    /// Only the first marker in reading order counts.
    pub fn extract(&self, source: &str) -> String {
        for line in source.lines() {
            if let Some(rest) = self.find_in_line(line) {
                return rest.trim().to_string();
            }
        }
        String::new()
    }

    fn find_in_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        for (pos, _) in line.char_indices() {
            let tail = &line[pos..];
            for label in &self.labels {
                let Some(head) = tail.get(..label.len()) else { continue };
                if !head.eq_ignore_ascii_case(label) {
                    continue;
                }
                let after = &tail[label.len()..];
                if let Some(c) = after.chars().next() {
                    if COLONS.contains(&c) {
                        return Some(&after[c.len_utf8()..]);
                    }
                }
            }
        }
        None
    }
}

/// [`MarkerSet::extract`] with the default labels.
pub fn extract_expected(source: &str) -> String {
    MarkerSet::default().extract(source)
}

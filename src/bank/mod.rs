//! Question bank loading.

use std::{collections::HashSet, fmt, fs, io, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("question bank not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("reading question bank {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed question bank {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("duplicate example id: {0} (scratch file stem {1})")]
    DuplicateId(ExampleId, String),
}

/// Question id as authored: integer or string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleId {
    Number(i64),
    Text(String),
}

impl ExampleId {
    /// Scratch file stem, `q<id>` with anything outside `[A-Za-z0-9_-]` replaced.
    pub fn file_stem(&self) -> String {
        let raw = self.to_string();
        let safe: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        format!("q{}", safe)
    }
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExampleId::Number(n) => write!(f, "{}", n),
            ExampleId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleRecord {
    pub id: ExampleId,
    pub source: String,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "codeExample")]
    code_example: Option<String>,
}

/// Read the bank at `path` into records, keeping file order.
pub fn load(path: &Path) -> Result<Vec<ExampleRecord>, LoadError> {
    if !path.exists() {
        return Err(LoadError::Missing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|e| match e {
        ParseFailure::Shape(reason) => LoadError::Parse { path: path.to_path_buf(), reason },
        ParseFailure::Duplicate(id, stem) => LoadError::DuplicateId(id, stem),
    })
}

enum ParseFailure {
    Shape(String),
    Duplicate(ExampleId, String),
}

fn parse(text: &str) -> Result<Vec<ExampleRecord>, ParseFailure> {
    let doc: Value = serde_json::from_str(text).map_err(|e| ParseFailure::Shape(e.to_string()))?;
    let items = match doc {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => return Err(ParseFailure::Shape("expected an array or an object with a `questions` array".into())),
        },
        _ => return Err(ParseFailure::Shape("expected an array or an object with a `questions` array".into())),
    };

    let mut records = Vec::with_capacity(items.len());
    let mut stems = HashSet::new();
    for (i, item) in items.into_iter().enumerate() {
        let raw: RawQuestion = serde_json::from_value(item)
            .map_err(|e| ParseFailure::Shape(format!("question #{}: {}", i + 1, e)))?;
        let id = match raw.id.unwrap_or(Value::Null) {
            Value::Number(n) => n
                .as_i64()
                .map(ExampleId::Number)
                .ok_or_else(|| ParseFailure::Shape(format!("question #{}: id {} is not an integer", i + 1, n)))?,
            Value::String(s) => ExampleId::Text(s),
            Value::Null => return Err(ParseFailure::Shape(format!("question #{}: missing id", i + 1))),
            other => {
                return Err(ParseFailure::Shape(format!(
                    "question #{}: id must be an integer or string, got {}",
                    i + 1,
                    other
                )))
            }
        };
        let stem = id.file_stem();
        if !stems.insert(stem.clone()) {
            return Err(ParseFailure::Duplicate(id, stem));
        }
        records.push(ExampleRecord { id, source: raw.code_example.unwrap_or_default() });
    }
    Ok(records)
}

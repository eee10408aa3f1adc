//! Flat `key=value` configuration parsing. One entry per line, no comments,
//! no quoting, values are always text. Later duplicates overwrite earlier
//! ones.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line_number} is not a single key=value pair: {line:?}")]
    MalformedLine { line_number: usize, line: String },
    #[error("config file unreadable at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parsed mapping. Stored ordered so printing is stable; callers should not
/// rely on ordering otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlatConfig(BTreeMap<String, String>);

impl FlatConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

impl Display for FlatConfig {
    /// `map[k1:v1 k2:v2]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("map[")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}:{value}")?;
        }
        f.write_str("]")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A line the lenient parser dropped. `line_number` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LenientParse {
    pub config: FlatConfig,
    pub skipped: Vec<SkippedLine>,
}

/// Splits a line on its only `=`. `None` when there are zero or several.
fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    if value.contains('=') {
        return None;
    }
    Some((key, value))
}

/// Non-empty lines with their 1-based line numbers.
fn content_lines(blob: &str) -> impl Iterator<Item = (usize, &str)> {
    blob.split('\n')
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| (idx + 1, line))
}

/// Parses `blob` strictly: every non-empty line must hold exactly one `=`.
/// The first offending line fails the whole call.
pub fn parse_flat_config(blob: &str) -> Result<FlatConfig, ConfigError> {
    let mut config = FlatConfig::default();
    for (line_number, line) in content_lines(blob) {
        let (key, value) = split_pair(line).ok_or_else(|| ConfigError::MalformedLine {
            line_number,
            line: line.to_string(),
        })?;
        config.insert(key, value);
    }
    debug!(entries = config.len(), "parsed flat config");
    Ok(config)
}

/// Parses `blob`, skipping and reporting lines that are not a single pair.
pub fn parse_flat_config_lenient(blob: &str) -> LenientParse {
    let mut parsed = LenientParse::default();
    for (line_number, line) in content_lines(blob) {
        match split_pair(line) {
            Some((key, value)) => parsed.config.insert(key, value),
            None => {
                warn!(line_number, "skipping malformed config line");
                parsed.skipped.push(SkippedLine {
                    line_number,
                    line: line.to_string(),
                });
            }
        }
    }
    debug!(
        entries = parsed.config.len(),
        skipped = parsed.skipped.len(),
        "parsed flat config leniently"
    );
    parsed
}

fn read_blob(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads `path` and parses it strictly.
pub fn load_flat_config(path: impl AsRef<Path>) -> Result<FlatConfig, ConfigError> {
    parse_flat_config(&read_blob(path.as_ref())?)
}

/// Reads `path` and parses it leniently. Only an unreadable file fails.
pub fn load_flat_config_lenient(path: impl AsRef<Path>) -> Result<LenientParse, ConfigError> {
    Ok(parse_flat_config_lenient(&read_blob(path.as_ref())?))
}

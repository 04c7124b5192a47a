use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a descriptor file into a typed entry.
///
/// Validation reports these as parse errors against the file and moves on;
/// the index builder and logo sync propagate them.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("document is empty")]
    Empty,
}

impl LoadError {
    /// Message suitable for a one-line diagnostic (no path prefix for parse
    /// failures, since the diagnostic already carries the file).
    pub fn diagnostic_message(&self) -> String {
        match self {
            LoadError::Read { source, .. } => format!("read error: {source}"),
            LoadError::Parse(err) => format!("YAML parse error: {err}"),
            LoadError::Empty => "YAML parse error: document is empty".to_string(),
        }
    }
}

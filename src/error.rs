//! Fatal error kinds. These are raised before the first trial (or when the
//! run itself can no longer continue); per-trial failures are never errors,
//! see [`crate::outcome::TrialOutcome`].
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WifiBfError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("wordlist unavailable: {}: {reason}", path.display())]
    ResourceUnavailable { path: PathBuf, reason: String },

    #[error("unsupported host platform '{0}' (only macOS is supported)")]
    PlatformUnsupported(String),

    #[error("failed reading wordlist at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("event sink failed: {0}")]
    Sink(#[source] io::Error),

    #[error("network scan failed: {0}")]
    Scan(String),
}

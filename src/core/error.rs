use std::fmt;

/// Comprehensive error types for linkscrub operations
///
/// Per-URL and per-record problems never surface here; they are recovered
/// locally and reported through statistics and events. These variants cover
/// the fatal, run-level failures only.
#[derive(Debug)]
pub enum LinkScrubError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Failed to read the input dataset
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write the output dataset or a report
    Write {
        path: String,
        source: std::io::Error,
    },

    /// Configuration error
    Config(String),

    /// HTTP client setup error
    Http(reqwest::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// Input file not found
    FileNotFound(String),

    /// Invalid argument error
    InvalidArgument(String),

    /// A worker terminated without producing output for its chunk;
    /// skipping it would corrupt line correspondence, so the run fails
    WorkerFailure { chunk_index: usize },
}

impl fmt::Display for LinkScrubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkScrubError::Io(err) => write!(f, "IO error: {err}"),
            LinkScrubError::Read { path, source } => {
                write!(f, "Read error: {path}: {source}")
            }
            LinkScrubError::Write { path, source } => {
                write!(f, "Write error: {path}: {source}")
            }
            LinkScrubError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LinkScrubError::Http(err) => write!(f, "HTTP client error: {err}"),
            LinkScrubError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            LinkScrubError::FileNotFound(path) => write!(f, "File not found: {path}"),
            LinkScrubError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            LinkScrubError::WorkerFailure { chunk_index } => {
                write!(f, "Merge error: no worker output for chunk {chunk_index}")
            }
        }
    }
}

impl std::error::Error for LinkScrubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LinkScrubError::Io(err) => Some(err),
            LinkScrubError::Read { source, .. } => Some(source),
            LinkScrubError::Write { source, .. } => Some(source),
            LinkScrubError::Http(err) => Some(err),
            LinkScrubError::TomlParsing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LinkScrubError {
    fn from(err: std::io::Error) -> Self {
        LinkScrubError::Io(err)
    }
}

impl From<reqwest::Error> for LinkScrubError {
    fn from(err: reqwest::Error) -> Self {
        LinkScrubError::Http(err)
    }
}

impl From<toml::de::Error> for LinkScrubError {
    fn from(err: toml::de::Error) -> Self {
        LinkScrubError::TomlParsing(err)
    }
}

/// Type alias for Results using LinkScrubError
pub type Result<T> = std::result::Result<T, LinkScrubError>;

use std::path::PathBuf;

/// Errors that can occur in breakdancer-rust.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {source} ({path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error("malformed read record at line {line}: {msg}")]
    ReadRecord { line: usize, msg: String },

    #[error("input is not coordinate-sorted: {0}")]
    Unsorted(String),

    #[error("read '{read}' refers to unknown library '{library}'")]
    UnknownLibrary { read: String, library: String },
}

impl Error {
    /// Convenience for wrapping an `io::Error` with a path context.
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            source: err,
            path: PathBuf::from("<stream>"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

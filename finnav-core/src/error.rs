use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    ContentFetchFailed { content_ref: String, reason: String },
    UnknownInstrumentId(String),
    PersistenceUnavailable(String),
    InvalidCatalog(String),
    JsonError(Box<dyn error::Error + Send + Sync>),
    IoError(io::Error),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentFetchFailed {
                content_ref,
                reason,
            } => write!(f, "Failed to fetch {content_ref}: {reason}"),
            Self::UnknownInstrumentId(id) => write!(f, "Unknown instrument: {id}"),
            Self::PersistenceUnavailable(reason) => write!(f, "Storage unavailable: {reason}"),
            Self::InvalidCatalog(reason) => write!(f, "Invalid catalog: {reason}"),
            Self::JsonError(err) => err.fmt(f),
            Self::IoError(err) => err.fmt(f),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonError(Box::new(err))
    }
}

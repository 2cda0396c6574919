use crate::backend::BackendError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not a repository: {0}")]
    InvalidDirectory(PathBuf),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Unable to {operation} ignore list: {source}")]
    Ignore {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Nothing to commit: {0}")]
    NothingToCommit(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn version(message: impl Into<String>) -> Self {
        Error::Version(message.into())
    }

    pub(crate) fn ignore(operation: &'static str, source: std::io::Error) -> Self {
        Error::Ignore { operation, source }
    }
}

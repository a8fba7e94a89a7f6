//! Error types for the `compose-addons` command.

use camino::Utf8PathBuf;
use compose_addons::{ComposeError, DocumentError};
use thiserror::Error;

/// Errors surfaced by the `compose-addons` pipeline.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// A transformation failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// An input document could not be parsed.
    #[error("failed to read document {origin}: {source}")]
    Document {
        /// Path of the document, or `<stdin>`.
        origin: String,
        /// Underlying codec error.
        #[source]
        source: DocumentError,
    },

    /// Fetch settings could not be assembled from file, environment and flags.
    #[error("invalid fetch settings: {0}")]
    Settings(#[from] Box<figment::Error>),

    /// A settings file named on the command line does not exist.
    #[error("settings file {0} does not exist")]
    MissingSettings(Utf8PathBuf),

    /// Reading an input or writing the output failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written, or `<stdin>` / `<stdout>`.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}

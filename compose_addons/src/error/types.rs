//! Primary error enum for document transformations.

use thiserror::Error;

/// Convenience alias for results returned by this crate.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors that can occur while fetching, including or rewriting documents.
///
/// Every variant is fatal for the invocation that raised it: include
/// resolution is all-or-nothing and never yields a partial tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ComposeError {
    /// The reference names a scheme no backend understands.
    #[error("Unsupported url scheme \"{scheme}\" for {reference}.")]
    UnsupportedScheme {
        /// Lower-cased scheme as written in the reference.
        scheme: String,
        /// Reference as supplied by the caller.
        reference: String,
    },

    /// The reference could not be interpreted at all.
    #[error("invalid reference '{reference}': {message}")]
    InvalidReference {
        /// Reference as supplied by the caller.
        reference: String,
        /// Human-readable explanation of the problem.
        message: String,
    },

    /// A backend failed to produce or parse the referenced document.
    #[error("Failed to include {reference}: {source}")]
    Fetch {
        /// Normalized reference that failed.
        reference: String,
        /// Underlying error reported by the backend or the parser.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An included document does not declare its namespace.
    #[error("Configuration {reference} requires a namespace")]
    MissingNamespace {
        /// Reference of the include, as written in the including document.
        reference: String,
    },

    /// The `include` directive of a document is not a list of references.
    #[error("malformed include directive in {origin}: {message}")]
    MalformedInclude {
        /// Where the offending document came from.
        origin: String,
        /// Human-readable explanation of the problem.
        message: String,
    },
}

//! Error constructors shared by the fetch backends.

use std::error::Error;

use super::ComposeError;

/// Construct a [`ComposeError::Fetch`] for `reference`.
pub(crate) fn fetch_error(
    reference: impl ToString,
    err: impl Into<Box<dyn Error + Send + Sync>>,
) -> ComposeError {
    ComposeError::Fetch {
        reference: reference.to_string(),
        source: err.into(),
    }
}

/// Construct the distinct "not found" flavour of [`ComposeError::Fetch`].
pub(crate) fn not_found(reference: impl ToString) -> ComposeError {
    fetch_error(
        reference,
        std::io::Error::new(std::io::ErrorKind::NotFound, "Not Found"),
    )
}

impl ComposeError {
    /// Returns `true` when the error reports a missing remote object or file.
    ///
    /// # Examples
    ///
    /// ```
    /// use compose_addons::ComposeError;
    ///
    /// let err = ComposeError::MissingNamespace { reference: "a.yml".to_owned() };
    /// assert!(!err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        let Self::Fetch { source, .. } = self else {
            return false;
        };
        source
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
    }
}

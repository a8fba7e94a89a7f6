//! Extension for mapping foreign errors onto a failed include.

use std::error::Error;

use super::{ComposeResult, fetch_error};

/// Maps any boxable error into [`ComposeError::Fetch`](super::ComposeError::Fetch).
///
/// # Examples
///
/// ```
/// use compose_addons::{ComposeResult, FetchResultExt};
///
/// fn read(path: &str) -> ComposeResult<Vec<u8>> {
///     std::fs::read(path).into_fetch_error(path)
/// }
///
/// assert!(read("/does/not/exist.yml").is_err());
/// ```
pub trait FetchResultExt<T> {
    /// Attribute the error to `reference`.
    ///
    /// # Errors
    ///
    /// Propagates the original error wrapped in `ComposeError::Fetch`.
    fn into_fetch_error(self, reference: impl ToString) -> ComposeResult<T>;
}

impl<T, E> FetchResultExt<T> for Result<T, E>
where
    E: Into<Box<dyn Error + Send + Sync>>,
{
    fn into_fetch_error(self, reference: impl ToString) -> ComposeResult<T> {
        self.map_err(|err| fetch_error(reference, err))
    }
}

//! Fetch referenced documents from local files, HTTP(S) or object storage.

mod file;
mod http;
mod object_store;
mod options;

use tracing::info;

use crate::document::parse_document;
use crate::error::{FetchResultExt, fetch_error, not_found};
use crate::reference::{Location, Reference};
use crate::{ComposeResult, ConfigTree};

use self::http::LazyClient;

pub use object_store::{ObjectStore, S3ObjectStore, StoreError};
pub use options::{DEFAULT_TIMEOUT_SECS, FetchOptions};

/// Resolves references to parsed documents.
///
/// The backend is chosen by the reference's scheme. Object storage is only
/// available once a store has been supplied with
/// [`Fetcher::with_object_store`].
///
/// # Examples
///
/// ```rust,no_run
/// use compose_addons::{FetchOptions, Fetcher, Reference, S3ObjectStore};
///
/// # fn run() -> compose_addons::ComposeResult<()> {
/// let options = FetchOptions::default();
/// let fetcher = Fetcher::new(options.clone())
///     .with_object_store(S3ObjectStore::new(options));
/// let tree = fetcher.fetch(&Reference::parse("s3://configs/api/compose.yml")?)?;
/// # Ok(())
/// # }
/// ```
pub struct Fetcher {
    http: LazyClient,
    object_store: Option<Box<dyn ObjectStore>>,
}

impl Fetcher {
    /// Construct a fetcher for local files and HTTP(S).
    #[must_use]
    pub const fn new(options: FetchOptions) -> Self {
        Self {
            http: LazyClient::new(options),
            object_store: None,
        }
    }

    /// Enable `s3://` references, served by `store`.
    #[must_use]
    pub fn with_object_store(mut self, store: impl ObjectStore + 'static) -> Self {
        self.object_store = Some(Box::new(store));
        self
    }

    /// Returns the options used for network fetches.
    #[must_use]
    pub const fn options(&self) -> &FetchOptions {
        self.http.options()
    }

    /// Fetch and parse the document named by `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Fetch`](crate::ComposeError::Fetch) when the
    /// backend fails, the object is missing, or the bytes are not a valid
    /// document.
    pub fn fetch(&self, reference: &Reference) -> ComposeResult<ConfigTree> {
        info!(%reference, "fetching config");
        let bytes = self.fetch_bytes(reference)?;
        parse_document(&bytes).into_fetch_error(reference)
    }

    fn fetch_bytes(&self, reference: &Reference) -> ComposeResult<Vec<u8>> {
        match reference.location() {
            Location::LocalFile(path) => file::read_file(reference, &path),
            Location::Http(url) => self
                .http
                .get()
                .and_then(|client| http::get(client, &url))
                .into_fetch_error(reference),
            Location::ObjectStorage { bucket, key } => {
                let store = self.object_store.as_deref().ok_or_else(|| {
                    fetch_error(reference, "object storage backend is not configured")
                })?;
                match store.get_object(&bucket, &key) {
                    Ok(Some(bytes)) => Ok(bytes),
                    Ok(None) => Err(not_found(reference)),
                    Err(err) => Err(fetch_error(reference, err)),
                }
            }
        }
    }
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("options", self.options())
            .field("object_store", &self.object_store.is_some())
            .finish()
    }
}

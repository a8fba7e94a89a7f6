//! Resolution of `include` directives into a single composite document.
//!
//! Each included document must declare a `namespace`. Includes are processed
//! depth-first in the order they are listed, and the result is a flat union
//! of top-level keys. Within an included document, keys contributed by its
//! own includes overwrite its keys, and the later include wins. The caller's
//! root document is the exception: its own keys always win.
//!
//! Reference cycles are not detected: a document that transitively includes
//! itself recurses until the stack is exhausted.

use serde_json::Value;
use tracing::debug;

use crate::cache::ResolutionCache;
use crate::fetch::{FetchOptions, Fetcher, S3ObjectStore};
use crate::reference::Reference;
use crate::tree::{INCLUDE_KEY, NAMESPACE_KEY, merge_flat};
use crate::{ComposeError, ComposeResult, ConfigTree};

/// Origin label used for the caller-supplied root document.
const ROOT_ORIGIN: &str = "<root>";

/// Walks `include` directives, fetching each referenced document through a
/// [`ResolutionCache`] so shared includes are fetched once per resolution.
///
/// Every call to [`IncludeResolver::resolve`] starts with an empty cache, so
/// a reused resolver always sees the current contents of its sources.
pub struct IncludeResolver<F> {
    fetch: F,
}

impl<F> IncludeResolver<F>
where
    F: FnMut(&Reference) -> ComposeResult<ConfigTree>,
{
    /// Construct a resolver fetching documents with `fetch`.
    #[must_use]
    pub const fn new(fetch: F) -> Self {
        Self { fetch }
    }

    /// Resolve every include reachable from `root` into one tree.
    ///
    /// The returned tree carries no `include` or `namespace` keys. Keys
    /// defined by `root` itself always win over included ones.
    ///
    /// # Errors
    ///
    /// Returns the first [`ComposeError`] raised while normalizing,
    /// fetching or validating an include. No partial result is produced.
    pub fn resolve(&mut self, mut root: ConfigTree) -> ComposeResult<ConfigTree> {
        root.remove(NAMESPACE_KEY);
        let mut cache = ResolutionCache::new(&mut self.fetch);
        let includes = take_includes(&mut root, ROOT_ORIGIN)?;
        let mut resolved = ConfigTree::new();
        for raw in includes {
            merge_flat(&mut resolved, fetch_include(&mut cache, ROOT_ORIGIN, &raw)?);
        }
        merge_flat(&mut resolved, root);
        debug!(fetched = cache.len(), "include resolution finished");
        Ok(resolved)
    }
}

impl<F> std::fmt::Debug for IncludeResolver<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncludeResolver").finish_non_exhaustive()
    }
}

/// Fetch the include `raw` named by `origin`, validate its namespace and
/// resolve its own includes over it.
fn fetch_include<G>(
    cache: &mut ResolutionCache<G>,
    origin: &str,
    raw: &str,
) -> ComposeResult<ConfigTree>
where
    G: FnMut(&Reference) -> ComposeResult<ConfigTree>,
{
    debug!(origin, include = raw, "resolving include");
    let reference = Reference::parse(raw)?;
    let mut tree = cache.get(&reference)?;
    let namespace = take_namespace(&mut tree, raw)?;
    debug!(include = raw, namespace, "include namespace validated");
    for nested in take_includes(&mut tree, raw)? {
        let included = fetch_include(cache, raw, &nested)?;
        merge_flat(&mut tree, included);
    }
    Ok(tree)
}

/// Remove the `include` directive from `tree`, returning its references.
fn take_includes(tree: &mut ConfigTree, origin: &str) -> ComposeResult<Vec<String>> {
    let malformed = |message: String| ComposeError::MalformedInclude {
        origin: origin.to_owned(),
        message,
    };
    match tree.remove(INCLUDE_KEY) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::String(reference) => Ok(reference),
                other => Err(malformed(format!(
                    "entry {index} must be a string reference, but found {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(malformed(format!(
            "'include' must be a list of references, but found {other}"
        ))),
    }
}

/// Remove and validate the `namespace` of an included document.
fn take_namespace(tree: &mut ConfigTree, reference: &str) -> ComposeResult<String> {
    match tree.remove(NAMESPACE_KEY) {
        Some(Value::String(namespace)) if !namespace.is_empty() => Ok(namespace),
        _ => Err(ComposeError::MissingNamespace {
            reference: reference.to_owned(),
        }),
    }
}

/// Resolve the includes of `root` using the bundled backends.
///
/// Local files and HTTP(S) are always available; `s3://` references are
/// served by an [`S3ObjectStore`] configured from `options`.
///
/// # Errors
///
/// Returns the first [`ComposeError`] raised during resolution.
///
/// # Examples
///
/// ```
/// use compose_addons::{FetchOptions, include, parse_document};
///
/// let root = parse_document(b"web:\n  image: example/web\n")?;
/// let resolved = include(root, FetchOptions::default())?;
/// assert_eq!(resolved["web"]["image"], "example/web");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn include(root: ConfigTree, options: FetchOptions) -> ComposeResult<ConfigTree> {
    let fetcher = Fetcher::new(options.clone()).with_object_store(S3ObjectStore::new(options));
    IncludeResolver::new(|reference: &Reference| fetcher.fetch(reference)).resolve(root)
}

#[cfg(test)]
mod tests;

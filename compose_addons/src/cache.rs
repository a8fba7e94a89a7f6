//! Per-run memoization of fetched documents.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::reference::Reference;
use crate::{ComposeResult, ConfigTree};

/// Caches each fetched document by normalized reference.
///
/// The cache owns the canonical copy of every tree; [`ResolutionCache::get`]
/// always hands out a fresh copy, so callers may strip keys from what they
/// receive without affecting the cache or each other. Failed fetches are not
/// cached.
///
/// # Examples
///
/// ```
/// use compose_addons::{ConfigTree, Reference, ResolutionCache};
///
/// let mut cache = ResolutionCache::new(|_: &Reference| Ok(ConfigTree::new()));
/// let reference = Reference::parse("a.yml")?;
/// let mut first = cache.get(&reference)?;
/// first.insert("namespace".into(), "a".into());
/// assert!(cache.get(&reference)?.is_empty());
/// # Ok::<(), compose_addons::ComposeError>(())
/// ```
pub struct ResolutionCache<F> {
    fetch: F,
    entries: HashMap<Reference, ConfigTree>,
}

impl<F> ResolutionCache<F>
where
    F: FnMut(&Reference) -> ComposeResult<ConfigTree>,
{
    /// Construct an empty cache backed by `fetch`.
    #[must_use]
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            entries: HashMap::new(),
        }
    }

    /// Return a copy of the document for `reference`, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Propagates any error from the backing fetch unchanged.
    pub fn get(&mut self, reference: &Reference) -> ComposeResult<ConfigTree> {
        let tree = match self.entries.entry(reference.clone()) {
            Entry::Occupied(entry) => {
                debug!(%reference, "config cache hit");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                debug!(%reference, "config cache miss");
                entry.insert((self.fetch)(reference)?)
            }
        };
        Ok(tree.clone())
    }

    /// Number of distinct documents fetched so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing has been fetched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F> std::fmt::Debug for ResolutionCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

//! Tools to supplement multi-service compose configuration.
//!
//! Three independent transformations operate on [`ConfigTree`] documents:
//!
//! - [`include()`] resolves `include` directives, pulling in namespaced
//!   documents from local files, HTTP(S) or object storage;
//! - [`merge_config`] deep merges override documents over a base;
//! - [`add_namespace`] prefixes services so a document can be included.

mod cache;
mod document;
mod error;
mod fetch;
mod include;
mod merge;
mod namespace;
mod reference;
mod tree;

pub use cache::ResolutionCache;
pub use document::{DocumentError, parse_document, to_document_string, write_document};
pub use error::{ComposeError, ComposeResult, FetchResultExt};
pub use fetch::{
    DEFAULT_TIMEOUT_SECS, FetchOptions, Fetcher, ObjectStore, S3ObjectStore, StoreError,
};
pub use include::{IncludeResolver, include};
pub use merge::{deep_merge, merge_config, merge_documents};
pub use namespace::{add_namespace, split_field};
pub use reference::{Location, Reference, Scheme};
pub use tree::{ConfigTree, INCLUDE_KEY, NAMESPACE_KEY, merge_flat};

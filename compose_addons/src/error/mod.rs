//! Error types produced while fetching, resolving and rewriting documents.

mod constructors;
mod result_ext;
mod types;

pub use result_ext::FetchResultExt;
pub use types::{ComposeError, ComposeResult};

pub(crate) use constructors::{fetch_error, not_found};

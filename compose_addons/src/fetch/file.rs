//! Local filesystem backend.

use std::path::Path;

use crate::ComposeResult;
use crate::error::FetchResultExt;
use crate::reference::Reference;

/// Read the document at `path`, relative paths resolving against the
/// working directory.
pub(super) fn read_file(reference: &Reference, path: &Path) -> ComposeResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|err| std::io::Error::new(err.kind(), format!("{}: {err}", path.display())))
        .into_fetch_error(reference)
}

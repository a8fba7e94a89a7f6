//! Reading input documents and writing results, from files or standard streams.

use std::io::Read;

use camino::Utf8Path;
use compose_addons::{ConfigTree, parse_document, write_document};

use crate::error::CliError;

const STDIN: &str = "<stdin>";
const STDOUT: &str = "<stdout>";

/// Treat a missing path, or `-`, as the standard stream.
fn named_path(path: Option<&Utf8Path>) -> Option<&Utf8Path> {
    path.filter(|p| p.as_str() != "-")
}

/// Read and parse the document at `path`, or standard input.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the input cannot be read and
/// [`CliError::Document`] if it does not parse.
pub fn read_document(path: Option<&Utf8Path>) -> Result<ConfigTree, CliError> {
    let (origin, bytes) = match named_path(path) {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|source| CliError::Io {
                path: path.to_string(),
                source,
            })?;
            (path.to_string(), bytes)
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut bytes)
                .map_err(|source| CliError::Io {
                    path: STDIN.to_owned(),
                    source,
                })?;
            (STDIN.to_owned(), bytes)
        }
    };
    parse_document(&bytes).map_err(|source| CliError::Document { origin, source })
}

/// Write `tree` to `path`, or standard output.
///
/// # Errors
///
/// Returns [`CliError::Io`] if the destination cannot be created or written.
pub fn write_result(tree: &ConfigTree, path: Option<&Utf8Path>) -> Result<(), CliError> {
    let (target, result) = match named_path(path) {
        Some(path) => {
            let result = std::fs::File::create(path)
                .map_err(compose_addons::DocumentError::from)
                .and_then(|file| write_document(tree, std::io::BufWriter::new(file)));
            (path.to_string(), result)
        }
        None => (STDOUT.to_owned(), write_document(tree, std::io::stdout().lock())),
    };
    result.map_err(|err| match err {
        compose_addons::DocumentError::Io(source) => CliError::Io {
            path: target,
            source,
        },
        other => CliError::Document {
            origin: target,
            source: other,
        },
    })
}

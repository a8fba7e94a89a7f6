//! Library backing the `compose-addons` command.
//!
//! The binary parses [`cli::Cli`], installs logging and hands over to
//! [`run`]. Keeping the pipeline here lets tests drive it without a process.

pub mod cli;
pub mod error;
pub mod io;
pub mod logging;
pub mod settings;

use compose_addons::{add_namespace, include, merge_documents};
use tracing::debug;

use crate::cli::{Cli, Command, IncludeArgs, MergeArgs, NamespaceArgs};
use crate::error::CliError;
use crate::io::{read_document, write_result};
use crate::settings::load_fetch_options;

/// Execute the subcommand selected in `cli`.
///
/// # Errors
///
/// Returns a [`CliError`] if reading inputs, loading settings, the
/// transformation itself, or writing the result fails.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Include(args) => run_include(args),
        Command::Merge(args) => run_merge(args),
        Command::Namespace(args) => run_namespace(args),
    }
}

fn run_include(args: &IncludeArgs) -> Result<(), CliError> {
    let options = load_fetch_options(args.fetch.settings_path.as_deref(), &args.fetch.overrides())?;
    debug!(timeout = options.timeout, verify_tls = options.verify_tls, "fetch settings");
    let root = read_document(args.compose_file.as_deref())?;
    let resolved = include(root, options)?;
    write_result(&resolved, args.output.output.as_deref())
}

fn run_merge(args: &MergeArgs) -> Result<(), CliError> {
    let base = read_document(Some(args.base.as_path()))?;
    let overrides = args
        .files
        .iter()
        .map(|path| read_document(Some(path.as_path())))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(overrides = overrides.len(), "merging documents");
    let merged = merge_documents(base, overrides);
    write_result(&merged, args.output.output.as_deref())
}

fn run_namespace(args: &NamespaceArgs) -> Result<(), CliError> {
    let tree = read_document(Some(args.compose_file.as_path()))?;
    let namespaced = add_namespace(tree, &args.namespace);
    write_result(&namespaced, args.output.output.as_deref())
}

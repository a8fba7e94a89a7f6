//! Serialised changes of the process working directory.
//!
//! Relative include references resolve against the working directory, which
//! is global to the test process. Every change made through this module holds
//! one lock until the previous directory is back in place.
//!
//! # Examples
//!
//! ```no_run
//! use compose_addons_test_helpers::cwd;
//!
//! let listing = cwd::with_dir("/tmp", || std::fs::read_dir(".").map(Iterator::count))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Mutex, MutexGuard};

static WORKING_DIR: Mutex<()> = Mutex::new(());

/// Holds the working-directory lock and the directory to return to.
///
/// Dropping the guard restores the directory, ignoring failures; call
/// [`DirGuard::restore`] to observe them.
#[must_use = "dropping the guard restores the previous working directory"]
pub struct DirGuard {
    previous: Option<Utf8PathBuf>,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    /// Directory that was current before the change.
    #[must_use]
    pub fn previous(&self) -> Option<&Utf8Path> {
        self.previous.as_deref()
    }

    /// Return to the previous directory and release the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the previous directory can no longer be entered.
    pub fn restore(mut self) -> Result<()> {
        match self.previous.take() {
            Some(previous) => std::env::set_current_dir(&previous)
                .with_context(|| format!("return to {previous}")),
            None => Ok(()),
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            // A failed restore must not mask the test's own panic.
            let _ignored = std::env::set_current_dir(previous);
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().context("read current dir")?;
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|dir| anyhow!("working directory {} is not UTF-8", dir.display()))
}

/// Enter `path`, returning a guard that comes back on drop.
///
/// Blocks while another guard is alive.
///
/// # Errors
///
/// Returns an error if the current directory is unreadable or not UTF-8, or
/// `path` cannot be entered.
pub fn set_dir(path: impl AsRef<std::path::Path>) -> Result<DirGuard> {
    let lock = WORKING_DIR.lock();
    let previous = current_dir()?;
    let path = path.as_ref();
    std::env::set_current_dir(path).with_context(|| format!("enter {}", path.display()))?;
    Ok(DirGuard {
        previous: Some(previous),
        _lock: lock,
    })
}

/// Run `body` inside `path` and return to the previous directory afterwards.
///
/// # Errors
///
/// Returns an error if the directory cannot be entered or left again.
pub fn with_dir<T>(path: impl AsRef<std::path::Path>, body: impl FnOnce() -> T) -> Result<T> {
    let guard = set_dir(path)?;
    let output = body();
    guard.restore()?;
    Ok(output)
}

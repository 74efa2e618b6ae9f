//! Batch workspace persistence.
//!
//! One batch lives in one directory:
//!
//! ```text
//! <root>/
//!   gauge.toml                    # configuration
//!   manifests/*.json              # screen manifests (read only)
//!   evidence/<screenId>.json      # capture output for the current cycle (read only)
//!   execution-plan.json           # written once, validated on every later run
//!   reports/
//!     validation-report.json
//!     scorecards.json
//!     batch-summary.json
//!     failure-report.json
//!     exceptions.json
//!     remediation-history.jsonl   # append-only, one line per cycle
//! ```

mod evidence;
mod history;
mod manifests;
mod plan;
mod reports;

pub use reports::Report;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("missing directory {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// File-based storage for one batch workspace.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Opens the batch workspace rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }
}

/// Attach the path to an I/O error.
fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Attach the path to a JSON error.
fn json_err(path: &Path) -> impl FnOnce(serde_json::Error) -> StorageError + '_ {
    move |source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// `*.json` files directly inside `dir`, sorted by file name.
///
/// Returns `None` if the directory doesn't exist.
fn json_files(dir: &Path) -> Result<Option<Vec<PathBuf>>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_err(dir)(e)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(io_err(dir))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    // Sort for deterministic output.
    files.sort();
    Ok(Some(files))
}

/// Write `contents` to `path`, creating parent directories.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(path, contents).map_err(io_err(path))
}

//! Checkpoint persistence for the result tree
//!
//! The tree is serialized to JSON in a temporary file beside the destination,
//! flushed to disk, and renamed over the destination. A failure at any step
//! leaves the previous checkpoint untouched.

use crate::model::ResultTree;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing or reading a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to serialize result tree: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write checkpoint to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move {from} into place at {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Writes snapshots of the result tree to one destination file
#[derive(Debug, Clone)]
pub struct CheckpointWriter {
    path: PathBuf,
    pretty: bool,
}

impl CheckpointWriter {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary file used while a checkpoint is being written
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("checkpoint"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Serializes `tree` and atomically replaces the destination file
    ///
    /// The caller's borrow of `tree` guarantees no concurrent mutation while
    /// the snapshot is taken.
    pub fn persist(&self, tree: &ResultTree) -> CheckpointResult<()> {
        let tmp_path = self.temp_path();

        if let Err(e) = self.write_temp(&tmp_path, tree) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            CheckpointError::Rename {
                from: tmp_path.clone(),
                to: self.path.clone(),
                source,
            }
        })?;

        tracing::debug!(
            "Checkpoint written to {} ({} services, {} methods)",
            self.path.display(),
            tree.services.len(),
            tree.method_count()
        );
        Ok(())
    }

    fn write_temp(&self, tmp_path: &Path, tree: &ResultTree) -> CheckpointResult<()> {
        let write_err = |source| CheckpointError::Write {
            path: tmp_path.to_path_buf(),
            source,
        };

        let file = File::create(tmp_path).map_err(write_err)?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, tree)?;
        } else {
            serde_json::to_writer(&mut writer, tree)?;
        }
        writer.write_all(b"\n").map_err(write_err)?;

        let file = writer
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
        Ok(())
    }
}

/// Reads a checkpoint file back into a result tree
pub fn load_checkpoint(path: &Path) -> CheckpointResult<ResultTree> {
    let content = fs::read_to_string(path).map_err(|source| CheckpointError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

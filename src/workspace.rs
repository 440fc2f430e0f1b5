// src/workspace.rs

use crate::models::DownloadTarget;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The temporary directory holding one partial file per worker.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
    filename: String,
    worker_count: usize,
}

impl Workspace {
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>, worker_count: usize) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
            worker_count,
        }
    }

    pub fn for_target(target: &DownloadTarget) -> Self {
        Self::new(
            target.workspace_dir(),
            target.filename(),
            target.worker_count(),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// e.g. `_file.zip.4/file.zip.4.2` for worker 2 of 4.
    pub fn partial_file_path(&self, worker: usize) -> PathBuf {
        self.dir
            .join(format!("{}.{}.{}", self.filename, self.worker_count, worker))
    }

    /// Creates the parent directories, then the workspace itself. Fails with
    /// `AlreadyExists` when another job already owns the directory.
    pub async fn create(&self) -> io::Result<()> {
        if let Some(parent) = self.dir.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::create_dir(&self.dir).await
    }

    /// Removes the directory and anything left in it. Succeeds when it is
    /// already gone.
    pub async fn remove(&self) -> io::Result<()> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Total length of the regular files under the directory.
    pub async fn disk_usage(&self) -> io::Result<u64> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || {
            let mut total = 0;
            for entry in WalkDir::new(&dir) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    total += entry.metadata()?.len();
                }
            }
            Ok::<u64, io::Error>(total)
        })
        .await
        .map_err(io::Error::other)?
    }
}

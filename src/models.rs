// src/models.rs

use std::path::{Path, PathBuf};

/// One worker's inclusive byte interval of the remote file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    low: u64,
    high: u64,
    /// 0-based worker index. Also the position of this range's partial file
    /// in the merged output.
    worker: usize,
}

impl Range {
    pub fn new(low: u64, high: u64, worker: usize) -> Self {
        Self { low, high, worker }
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Number of bytes between `low` and `high`, both ends included.
    pub fn len(&self) -> u64 {
        self.high.saturating_add(1).saturating_sub(self.low)
    }

    pub fn is_empty(&self) -> bool {
        self.high < self.low
    }

    /// Value for the HTTP `Range` request header, e.g. `bytes=0-249`.
    pub fn header_value(&self) -> String {
        format!("bytes={}-{}", self.low, self.high)
    }
}

/// Everything one download job knows about its output.
///
/// Built once the remote size is known and the filename is resolved; it is
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    filename: String,
    file_size: u64,
    destination: PathBuf,
    workspace_dir: PathBuf,
    worker_count: usize,
}

impl DownloadTarget {
    pub fn new(
        filename: impl Into<String>,
        file_size: u64,
        destination: impl Into<PathBuf>,
        worker_count: usize,
    ) -> Self {
        let filename = filename.into();
        let destination = destination.into();
        let workspace_dir = workspace_dir(&destination, &filename, worker_count);
        Self {
            filename,
            file_size,
            destination,
            workspace_dir,
            worker_count,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Directory the final file is written into. Empty means the current
    /// directory.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// e.g. for "file.zip" with 4 workers in "/tmp", returns "/tmp/_file.zip.4"
    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn output_path(&self) -> PathBuf {
        self.destination.join(&self.filename)
    }
}

/// `<destination>/_<filename>.<worker_count>`
pub fn workspace_dir(destination: &Path, filename: &str, worker_count: usize) -> PathBuf {
    destination.join(format!("_{}.{}", filename, worker_count))
}

// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while downloading, monitoring or merging a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("server responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("server did not report a content length")]
    MissingContentLength,
    #[error("server does not accept byte range requests")]
    RangesUnsupported,
    #[error("remote file is empty")]
    EmptyResource,
    #[error("could not determine the home directory")]
    HomeDir,
    #[error(
        "there is not sufficient free space in a disk: {required} bytes required, {available} available"
    )]
    InsufficientSpace { required: u64, available: u64 },
    #[error("worker {worker} failed: {source}")]
    Transport {
        worker: usize,
        source: Box<DownloadError>,
    },
    #[error("failed to get directory size: {0}")]
    ProgressProbe(#[source] std::io::Error),
    #[error("workers finished with {received} of {expected} bytes on disk")]
    Incomplete { expected: u64, received: u64 },
    #[error("failed to {step} {}: {source}", .path.display())]
    Merge {
        step: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("workspace {} is already in use by another download", .0.display())]
    WorkspaceBusy(PathBuf),
    #[error("download cancelled")]
    Cancelled,
    #[error("task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl DownloadError {
    pub(crate) fn merge(step: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DownloadError::Merge {
            step,
            path: path.into(),
            source,
        }
    }

    /// True when the error, or the worker failure it wraps, is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            DownloadError::Cancelled => true,
            DownloadError::Transport { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

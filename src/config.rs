// src/config.rs

use crate::progress::DEFAULT_POLL_INTERVAL;
use std::path::PathBuf;
use std::time::Duration;

/// Options for one download job.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub url: String,
    /// Directory the file is written into. Empty means the current directory.
    pub destination: PathBuf,
    /// Explicit output file name. When unset the name comes from the URL and
    /// is made unique in `destination`.
    pub output_name: Option<String>,
    /// Number of ranges fetched concurrently.
    pub workers: usize,
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,
    /// How often the workspace size is polled for progress.
    pub poll_interval: Duration,
    pub user_agent: String,
    /// Hide the progress bars.
    pub quiet: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            destination: PathBuf::new(),
            output_name: None,
            workers: default_workers(),
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
            user_agent: concat!("pget/", env!("CARGO_PKG_VERSION")).to_string(),
            quiet: false,
        }
    }
}

/// One worker per available CPU.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

pub mod config;
pub mod downloader;
pub mod error;
pub mod merge;
pub mod models;
pub mod naming;
pub mod pool;
pub mod progress;
pub mod range;
pub mod space;
pub mod transport;
pub mod workspace;

/// Convenient type alias exposing common structs.
pub mod prelude {
    pub use crate::config::DownloadConfig;
    pub use crate::downloader::{run_download, DownloadReport, Downloader};
    pub use crate::error::DownloadError;
    pub use crate::models::{DownloadTarget, Range};
    pub use crate::space::{DiskSpace, SpaceGuard};
    pub use crate::transport::{HttpFetcher, RangeFetcher};
}

// src/pool.rs

use crate::error::DownloadError;
use crate::models::Range;
use crate::transport::RangeFetcher;
use crate::workspace::Workspace;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Runs one fetch per range, all at once.
#[derive(Clone)]
pub struct WorkerPool {
    fetcher: Arc<dyn RangeFetcher>,
}

impl WorkerPool {
    pub fn new(fetcher: Arc<dyn RangeFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches every range into its partial file in `workspace`.
    ///
    /// The first failure cancels `cancel`, aborts the other workers and is
    /// returned wrapped in `DownloadError::Transport`. On success returns the
    /// total number of bytes written.
    pub async fn run(
        &self,
        url: &str,
        ranges: &[Range],
        workspace: &Workspace,
        cancel: &CancellationToken,
    ) -> Result<u64, DownloadError> {
        let mut tasks = JoinSet::new();
        for range in ranges {
            let fetcher = self.fetcher.clone();
            let url = url.to_string();
            let range = range.clone();
            let destination = workspace.partial_file_path(range.worker());
            let cancel = cancel.clone();
            tasks.spawn(async move {
                fetcher
                    .fetch(&url, &range, &destination, &cancel)
                    .await
                    .map_err(|e| DownloadError::Transport {
                        worker: range.worker(),
                        source: Box::new(e),
                    })
            });
        }
        debug!(workers = ranges.len(), "workers started");

        let mut total = 0u64;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => Err(DownloadError::TaskJoin(e)),
            };
            match result {
                Ok(written) => total += written,
                Err(e) => {
                    if !e.is_cancelled() {
                        warn!(error = %e, "worker failed, stopping the others");
                    }
                    cancel.cancel();
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }
        Ok(total)
    }
}

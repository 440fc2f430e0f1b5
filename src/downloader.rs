// src/downloader.rs

use crate::config::DownloadConfig;
use crate::error::DownloadError;
use crate::merge::merge;
use crate::models::{DownloadTarget, Range};
use crate::naming;
use crate::pool::WorkerPool;
use crate::progress::{byte_bar, ProgressMonitor, ProgressSignal};
use crate::range;
use crate::space::{required_space, SpaceGuard};
use crate::transport::{self, HttpFetcher, RangeFetcher};
use crate::workspace::Workspace;
use reqwest::Client;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Outcome of a finished download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Downloads one file with several concurrent range requests.
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
    fetcher: Arc<dyn RangeFetcher>,
    space: Option<SpaceGuard>,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.timeout)
            .build()?;
        let fetcher = Arc::new(HttpFetcher::new(client.clone()));
        Ok(Self {
            client,
            config,
            fetcher,
            space: None,
        })
    }

    /// Replaces the HTTP range fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn RangeFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the free space check of the destination volume.
    pub fn with_space_guard(mut self, guard: SpaceGuard) -> Self {
        self.space = Some(guard);
        self
    }

    /// Probes, checks disk space, fetches every range and merges the parts.
    ///
    /// Once the workspace exists, every failure and cancellation removes it
    /// before returning.
    pub async fn run(&self, cancel: CancellationToken) -> Result<DownloadReport, DownloadError> {
        let started = Instant::now();
        let url = self.config.url.as_str();
        Url::parse(url).map_err(|_| DownloadError::InvalidUrl(url.to_string()))?;

        let file_size = tokio::select! {
            _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
            size = transport::probe(&self.client, url, self.config.timeout) => size?,
        };
        if file_size == 0 {
            return Err(DownloadError::EmptyResource);
        }

        let workers = self.worker_count(file_size);
        let ranges = range::compute_ranges(file_size, workers);

        let required = required_space(file_size, range::chunk_size(file_size, workers));
        match &self.space {
            Some(guard) => guard.check_free(required)?,
            None => SpaceGuard::for_destination(&self.config.destination).check_free(required)?,
        }

        let (target, workspace) = self.claim_workspace(file_size, workers).await?;
        info!(
            file = target.filename(),
            size = file_size,
            workers,
            "starting download"
        );

        match self.fetch_and_merge(&target, &ranges, &workspace, &cancel).await {
            Ok(bytes) => {
                let report = DownloadReport {
                    path: target.output_path(),
                    bytes,
                    workers,
                    elapsed: started.elapsed(),
                };
                info!(path = %report.path.display(), bytes, elapsed = ?report.elapsed, "download complete");
                Ok(report)
            }
            Err(e) => {
                if let Err(cleanup) = workspace.remove().await {
                    warn!(dir = %workspace.dir().display(), error = %cleanup, "failed to remove workspace");
                }
                Err(e)
            }
        }
    }

    /// Picks the output name and creates its workspace. A URL-derived name
    /// whose workspace another job created in the meantime moves on to the
    /// next free name; an explicit name fails with `WorkspaceBusy`.
    async fn claim_workspace(
        &self,
        file_size: u64,
        workers: usize,
    ) -> Result<(DownloadTarget, Workspace), DownloadError> {
        let destination = &self.config.destination;
        loop {
            let filename = match &self.config.output_name {
                Some(name) => name.clone(),
                None => naming::resolve_filename(&self.config.url, destination, workers)?,
            };
            let target = DownloadTarget::new(filename, file_size, destination.clone(), workers);
            let workspace = Workspace::for_target(&target);
            match workspace.create().await {
                Ok(()) => return Ok((target, workspace)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if self.config.output_name.is_some() {
                        return Err(DownloadError::WorkspaceBusy(workspace.dir().to_path_buf()));
                    }
                    debug!(dir = %workspace.dir().display(), "workspace taken, trying the next name");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn fetch_and_merge(
        &self,
        target: &DownloadTarget,
        ranges: &[Range],
        workspace: &Workspace,
        cancel: &CancellationToken,
    ) -> Result<u64, DownloadError> {
        let job = cancel.child_token();
        let workers_done = CancellationToken::new();

        let bar = byte_bar(target.file_size(), "downloading", self.config.quiet);
        let monitor = ProgressMonitor::new(Arc::new(workspace.clone()), Arc::new(bar), target.file_size())
            .with_interval(self.config.poll_interval)
            .spawn(job.clone(), workers_done.clone());

        let fetched = WorkerPool::new(self.fetcher.clone())
            .run(&self.config.url, ranges, workspace, &job)
            .await;
        match &fetched {
            Ok(bytes) => {
                debug!(bytes, "all workers finished");
                workers_done.cancel();
            }
            Err(_) => job.cancel(),
        }
        let monitored = monitor.await?;

        let (fetched, signal) = match (fetched, monitored) {
            _ if cancel.is_cancelled() => Err(DownloadError::Cancelled),
            (Err(e), _) if !e.is_cancelled() => Err(e),
            (_, Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Ok(bytes), Ok(signal)) => Ok((bytes, signal)),
        }?;
        if signal == ProgressSignal::Cancelled {
            return Err(DownloadError::Cancelled);
        }
        // The workspace size can include files no worker wrote.
        ensure_complete(target.file_size(), fetched)?;

        let bar = byte_bar(target.file_size(), "merging", self.config.quiet);
        let merged = merge(target, workspace, &bar).await?;
        ensure_complete(target.file_size(), merged)?;
        Ok(merged)
    }

    fn worker_count(&self, file_size: u64) -> usize {
        let requested = self.config.workers.max(1);
        let limit = usize::try_from(file_size).unwrap_or(usize::MAX);
        if requested > limit {
            warn!(requested, file_size, "file is smaller than the worker count, using one byte per worker");
            return limit;
        }
        requested
    }
}

fn ensure_complete(expected: u64, received: u64) -> Result<(), DownloadError> {
    if received != expected {
        return Err(DownloadError::Incomplete { expected, received });
    }
    Ok(())
}

/// Runs one download to completion with a fresh `Downloader`.
pub async fn run_download(
    config: DownloadConfig,
    cancel: CancellationToken,
) -> Result<DownloadReport, DownloadError> {
    Downloader::new(config)?.run(cancel).await
}

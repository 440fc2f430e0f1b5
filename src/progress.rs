// src/progress.rs

use crate::error::DownloadError;
use crate::workspace::Workspace;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How the monitor stopped when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressSignal {
    /// The workspace reached the total size.
    Completed,
    /// The job's cancellation token fired first.
    Cancelled,
}

/// Reports how many bytes are on disk.
#[async_trait]
pub trait SizeProbe: Send + Sync {
    async fn size(&self) -> io::Result<u64>;
}

#[async_trait]
impl SizeProbe for Workspace {
    async fn size(&self) -> io::Result<u64> {
        self.disk_usage().await
    }
}

/// Receives progress updates, in bytes.
pub trait ProgressSink: Send + Sync {
    fn set_position(&self, bytes: u64);
    fn finish(&self);
    fn abandon(&self) {}
}

impl ProgressSink for ProgressBar {
    fn set_position(&self, bytes: u64) {
        ProgressBar::set_position(self, bytes);
    }

    fn finish(&self) {
        ProgressBar::finish(self);
    }

    fn abandon(&self) {
        ProgressBar::abandon(self);
    }
}

/// Byte progress bar, or a hidden one when `quiet`.
pub fn byte_bar(total: u64, message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {bytes}/{total_bytes} {percent}% ({bytes_per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    bar.set_message(message);
    bar
}

/// Polls the on-disk size of a download until it reaches the expected total.
pub struct ProgressMonitor {
    probe: Arc<dyn SizeProbe>,
    sink: Arc<dyn ProgressSink>,
    total: u64,
    interval: Duration,
}

impl ProgressMonitor {
    pub fn new(probe: Arc<dyn SizeProbe>, sink: Arc<dyn ProgressSink>, total: u64) -> Self {
        Self {
            probe,
            sink,
            total,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Runs the monitor on its own task. A probe failure also cancels
    /// `cancel` so the workers stop.
    pub fn spawn(
        self,
        cancel: CancellationToken,
        workers_done: CancellationToken,
    ) -> JoinHandle<Result<ProgressSignal, DownloadError>> {
        tokio::spawn(async move {
            let result = self.run(&cancel, &workers_done).await;
            if result.is_err() {
                cancel.cancel();
            }
            result
        })
    }

    /// Polls until the total is reached, `cancel` fires or the probe fails.
    ///
    /// Once `workers_done` has fired, the next probe must reach the total;
    /// anything short of it is `DownloadError::Incomplete`.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        workers_done: &CancellationToken,
    ) -> Result<ProgressSignal, DownloadError> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reported = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(reported, "progress monitor cancelled");
                    self.sink.abandon();
                    return Ok(ProgressSignal::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            let settled = workers_done.is_cancelled();
            let size = match self.probe.size().await {
                Ok(size) => size,
                Err(e) => {
                    self.sink.abandon();
                    return Err(DownloadError::ProgressProbe(e));
                }
            };

            if size >= self.total {
                self.sink.set_position(self.total);
                self.sink.finish();
                debug!(total = self.total, "download size reached");
                return Ok(ProgressSignal::Completed);
            }

            reported = reported.max(size);
            self.sink.set_position(reported);

            if settled {
                self.sink.abandon();
                return Err(DownloadError::Incomplete {
                    expected: self.total,
                    received: size,
                });
            }
        }
    }
}

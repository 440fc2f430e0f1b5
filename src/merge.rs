// src/merge.rs

use crate::error::DownloadError;
use crate::models::DownloadTarget;
use crate::progress::ProgressSink;
use crate::workspace::Workspace;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, info};

/// Concatenates the partial files into the final output, in ascending worker
/// order, deleting each one once copied, then removes the workspace.
///
/// A failure part-way leaves the output partially written.
pub async fn merge(
    target: &DownloadTarget,
    workspace: &Workspace,
    sink: &dyn ProgressSink,
) -> Result<u64, DownloadError> {
    let output = target.output_path();
    info!(output = %output.display(), parts = target.worker_count(), "binding with files");

    let file = File::create(&output)
        .await
        .map_err(|e| DownloadError::merge("create", &output, e))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0u64;

    for worker in 0..target.worker_count() {
        let part = workspace.partial_file_path(worker);
        let src = File::open(&part)
            .await
            .map_err(|e| DownloadError::merge("open", &part, e))?;
        let mut reader = BufReader::new(src);
        let copied = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(|e| DownloadError::merge("copy", &part, e))?;
        writer
            .flush()
            .await
            .map_err(|e| DownloadError::merge("write", &output, e))?;
        drop(reader);
        written += copied;
        sink.set_position(written);

        tokio::fs::remove_file(&part)
            .await
            .map_err(|e| DownloadError::merge("remove", &part, e))?;
        debug!(worker, copied, "partial file merged");
    }

    sink.finish();

    workspace
        .remove()
        .await
        .map_err(|e| DownloadError::merge("remove", workspace.dir(), e))?;
    Ok(written)
}

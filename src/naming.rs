// src/naming.rs

use crate::error::DownloadError;
use crate::models::workspace_dir;
use std::path::{Path, PathBuf};
use url::Url;

/// Last non-empty path segment of `url`.
pub fn filename_from_url(url: &str) -> Result<String, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::InvalidUrl(url.to_string()))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| DownloadError::InvalidUrl(url.to_string()))
}

/// Name derived from `url` that is not taken yet in `dir`: `file`, then
/// `file-1`, `file-2`, ...
///
/// A name is taken when the file exists or when a download with
/// `worker_count` workers is already using its workspace.
pub fn resolve_filename(url: &str, dir: &Path, worker_count: usize) -> Result<String, DownloadError> {
    let original = filename_from_url(url)?;
    let mut candidate = original.clone();
    let mut suffix = 1;
    while dir.join(&candidate).exists() || workspace_dir(dir, &candidate, worker_count).exists() {
        candidate = format!("{}-{}", original, suffix);
        suffix += 1;
    }
    Ok(candidate)
}

/// Splits an output path into (file name, directory).
///
/// A trailing separator makes the last named segment the file name. On Unix
/// a leading `~` segment is replaced by the home directory.
pub fn split_path(output: &str) -> Result<(String, PathBuf), DownloadError> {
    if cfg!(windows) {
        Ok(split_dos(output))
    } else {
        split_unix(output, || dirs::home_dir().ok_or(DownloadError::HomeDir))
    }
}

fn split_dos(output: &str) -> (String, PathBuf) {
    let parts: Vec<&str> = output.split('\\').collect();
    let (file, dir) = split_parts(&parts, "\\");
    (file, PathBuf::from(dir))
}

fn split_unix<F>(output: &str, home: F) -> Result<(String, PathBuf), DownloadError>
where
    F: FnOnce() -> Result<PathBuf, DownloadError>,
{
    let mut parts: Vec<String> = output.split('/').map(str::to_string).collect();
    if parts.len() == 1 {
        return Ok((output.to_string(), PathBuf::new()));
    }

    if parts[0] == "~" {
        parts[0] = home()?.to_string_lossy().into_owned();
    } else if parts[1] == "~" {
        parts[1] = home()?.to_string_lossy().into_owned();
        parts.remove(0);
    }

    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    let (file, mut dir) = split_parts(&parts, "/");
    if dir.is_empty() && output.starts_with('/') && parts.len() > 1 {
        dir = "/".to_string();
    }
    Ok((file, PathBuf::from(dir)))
}

fn split_parts(parts: &[&str], separator: &str) -> (String, String) {
    match parts {
        [] => (String::new(), String::new()),
        [only] => (only.to_string(), String::new()),
        [rest @ .., file, ""] => (file.to_string(), rest.join(separator)),
        [rest @ .., file] => (file.to_string(), rest.join(separator)),
    }
}

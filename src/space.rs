// src/space.rs

use crate::error::DownloadError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of the free byte count on the volume a download writes to.
pub trait DiskSpace: Send + Sync {
    fn available(&self) -> io::Result<u64>;
}

/// Free space of the volume holding `path`, read with `fs2`.
#[derive(Debug, Clone)]
pub struct VolumeSpace {
    path: PathBuf,
}

impl VolumeSpace {
    /// Uses the nearest existing ancestor of `path`, or the system root when
    /// none of it exists yet.
    pub fn for_path(path: &Path) -> Self {
        let mut candidate = if path.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            path.to_path_buf()
        };
        while !candidate.exists() {
            if !candidate.pop() {
                candidate = system_root();
                break;
            }
            if candidate.as_os_str().is_empty() {
                candidate = PathBuf::from(".");
                break;
            }
        }
        Self { path: candidate }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiskSpace for VolumeSpace {
    fn available(&self) -> io::Result<u64> {
        fs2::available_space(&self.path)
    }
}

fn system_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

/// Space a job needs: the file itself plus one extra split for the partial
/// files that still exist while the merged output grows.
pub fn required_space(file_size: u64, chunk_size: u64) -> u64 {
    file_size.saturating_add(chunk_size)
}

/// Admission check run before any workspace is created.
pub struct SpaceGuard {
    disk: Box<dyn DiskSpace>,
}

impl SpaceGuard {
    pub fn new(disk: Box<dyn DiskSpace>) -> Self {
        Self { disk }
    }

    pub fn for_destination(destination: &Path) -> Self {
        Self::new(Box::new(VolumeSpace::for_path(destination)))
    }

    pub fn check_free(&self, required: u64) -> Result<(), DownloadError> {
        let available = self.disk.available()?;
        debug!(required, available, "checked free disk space");
        if available < required {
            return Err(DownloadError::InsufficientSpace {
                required,
                available,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u64);

    impl DiskSpace for Fixed {
        fn available(&self) -> io::Result<u64> {
            Ok(self.0)
        }
    }

    struct Broken;

    impl DiskSpace for Broken {
        fn available(&self) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Other, "statvfs failed"))
        }
    }

    #[test]
    fn admits_when_space_suffices() {
        let guard = SpaceGuard::new(Box::new(Fixed(1250)));
        assert!(guard.check_free(required_space(1000, 250)).is_ok());
    }

    #[test]
    fn rejects_when_space_is_short_by_one_byte() {
        let guard = SpaceGuard::new(Box::new(Fixed(1249)));
        match guard.check_free(required_space(1000, 250)) {
            Err(DownloadError::InsufficientSpace {
                required,
                available,
            }) => {
                assert_eq!(required, 1250);
                assert_eq!(available, 1249);
            }
            other => panic!("expected InsufficientSpace, got {other:?}"),
        }
    }

    #[test]
    fn probe_failure_is_reported() {
        let guard = SpaceGuard::new(Box::new(Broken));
        assert!(matches!(guard.check_free(1), Err(DownloadError::Io(_))));
    }

    #[test]
    fn volume_space_walks_up_to_an_existing_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("a").join("b");
        let volume = VolumeSpace::for_path(&missing);
        assert_eq!(volume.path(), dir.path());
        assert!(volume.available().is_ok());
    }
}

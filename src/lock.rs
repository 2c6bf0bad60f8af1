use std::fs::{File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Where lock files are created unless configured otherwise.
pub const DEFAULT_LOCK_DIR: &str = "/var/run";

#[derive(Debug, Error)]
pub enum LockError {
    /// Another process holds the lock. This more likely means a stuck reader than a transient
    /// one, so it is never waited on.
    #[error("lock file {} is in use", path.display())]
    Busy { path: PathBuf },
    #[error("failed to access lock file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// An exclusive, system-wide claim on one sensor.
///
/// The advisory lock is released when this is dropped or [`DeviceLock::release`]d.
#[derive(Debug)]
pub struct DeviceLock {
    file: File,
    path: PathBuf,
}

/// Path of the lock file for a device.
pub fn lock_path(dir: &Path, device_id: u8) -> PathBuf {
    dir.join(format!("dht{}.lock", device_id))
}

impl DeviceLock {
    /// Takes the lock for `device_id` without blocking.
    pub fn acquire(dir: &Path, device_id: u8) -> Result<DeviceLock, LockError> {
        let path = lock_path(dir, device_id);
        let file = open_lock_file(&path).map_err(|source| LockError::Io {
            path: path.clone(),
            source,
        })?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => return Err(LockError::Busy { path }),
            Err(TryLockError::Error(source)) => return Err(LockError::Io { path, source }),
        }
        debug!(path = %path.display(), "lock acquired");
        Ok(DeviceLock { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the lock, reporting any failure to do so.
    pub fn release(self) -> Result<(), LockError> {
        self.file.unlock().map_err(|source| LockError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "lock released");
        Ok(())
    }
}

impl Drop for DeviceLock {
    fn drop(&mut self) {
        // Closing the descriptor drops the lock; unlocking first just surfaces errors.
        if let Err(err) = self.file.unlock() {
            warn!(path = %self.path.display(), %err, "failed to unlock");
        }
    }
}

#[cfg(unix)]
fn open_lock_file(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)
}

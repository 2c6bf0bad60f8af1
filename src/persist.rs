use crate::reading::{Classification, Reading};
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Where readings are kept unless configured otherwise.
pub const DEFAULT_STATE_DIR: &str = "/var/lib/dht-sentinel";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: &'static str },
}

/// Keeps the last good reading for each device between runs.
pub trait ReadingStore {
    /// The stored reading for `device_id`, or `None` if nothing has been stored yet.
    fn load(&self, device_id: u8) -> Result<Option<Reading>, PersistError>;

    /// Replaces the stored reading for `device_id`.
    fn store(&self, device_id: u8, reading: &Reading) -> Result<(), PersistError>;
}

/// A [`ReadingStore`] with one small text file per device.
///
/// Each file holds a single line: the device id, then temperature and humidity as integers in
/// thousandths.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> FileStore {
        FileStore { dir: dir.into() }
    }

    pub fn path(&self, device_id: u8) -> PathBuf {
        self.dir.join(format!("dht{}.reading", device_id))
    }
}

impl ReadingStore for FileStore {
    fn load(&self, device_id: u8) -> Result<Option<Reading>, PersistError> {
        let path = self.path(device_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored reading");
                return Ok(None);
            }
            Err(source) => return Err(PersistError::Io { path, source }),
        };

        match parse_record(&contents, device_id) {
            Ok(reading) => Ok(Some(reading)),
            Err(reason) => Err(PersistError::Corrupt { path, reason }),
        }
    }

    fn store(&self, device_id: u8, reading: &Reading) -> Result<(), PersistError> {
        let path = self.path(device_id);
        fs::write(&path, format_record(device_id, reading))
            .map_err(|source| PersistError::Io { path, source })
    }
}

fn to_milli(value: f32) -> i64 {
    (value as f64 * 1000.0 + 0.5).floor() as i64
}

fn format_record(device_id: u8, reading: &Reading) -> String {
    format!(
        "{} {} {}\n",
        device_id,
        to_milli(reading.temperature),
        to_milli(reading.humidity)
    )
}

fn parse_record(contents: &str, device_id: u8) -> Result<Reading, &'static str> {
    let mut fields = contents.split_whitespace();
    let mut next_field = |missing: &'static str| fields.next().ok_or(missing);

    let stored_id: u8 = next_field("missing device id")?
        .parse()
        .map_err(|_| "invalid device id")?;
    let temperature_milli: i64 = next_field("missing temperature")?
        .parse()
        .map_err(|_| "invalid temperature")?;
    let humidity_milli: i64 = next_field("missing humidity")?
        .parse()
        .map_err(|_| "invalid humidity")?;
    if fields.next().is_some() {
        return Err("trailing data");
    }
    if stored_id != device_id {
        return Err("device id mismatch");
    }

    Ok(Reading::new(
        Classification::Ok,
        (humidity_milli as f64 / 1000.0) as f32,
        (temperature_milli as f64 / 1000.0) as f32,
    ))
}

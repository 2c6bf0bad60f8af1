/// Drives repeated reads until a trustworthy reading is obtained.
pub mod acquire;
/// Wakes the sensor and records the timing of its response.
pub mod capture;
/// Turns captured pulse timings into a checksum-verified frame.
pub mod decode;
/// Errors that stop an acquisition outright.
pub mod error;
/// Sanity and consistency checks on decoded values.
pub mod evaluate;
/// The GPIO capability the sensor is read through, and an adapter for embedded-hal pins.
pub mod line;
/// Exclusive per-sensor lock files.
pub mod lock;
/// The last good reading of each sensor, kept between runs.
pub mod persist;
/// Readings and how far they can be trusted.
pub mod reading;
/// Linux sysfs GPIO pins.
pub mod sysfs;

pub use acquire::{Controller, Options, DEFAULT_OPTIONS};
pub use error::Error;
pub use reading::{Classification, Reading};

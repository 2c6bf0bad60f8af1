use core::fmt;

/// How far a reading can be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Valid values appear to have been found.
    Ok,
    /// The frame was short or failed its checksum.
    BadData,
    /// Humidity and temperature are both zero, which is suspicious.
    AllZero,
    /// The values jumped too far from the last known good reading.
    Inconsistent,
    /// The values are out of the sensor's range.
    Invalid,
}

/// The outcome of one decode-and-evaluate cycle.
///
/// Only a reading classified [`Classification::Ok`] should be trusted. Other readings may still
/// carry values, which are useful for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    pub classification: Classification,
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Temperature in degrees Celsius.
    pub temperature: f32,
}

impl Reading {
    pub fn new(classification: Classification, humidity: f32, temperature: f32) -> Reading {
        Reading {
            classification,
            humidity,
            temperature,
        }
    }

    /// A reading for a frame that could not be decoded.
    pub fn bad_data() -> Reading {
        Reading::new(Classification::BadData, 0.0, 0.0)
    }

    pub fn is_ok(&self) -> bool {
        self.classification == Classification::Ok
    }

    pub fn fahrenheit(&self) -> f32 {
        self.temperature * 9.0 / 5.0 + 32.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RH: {:.2}%, T: {:.2}\u{00B0}C ({:?})",
            self.humidity, self.temperature, self.classification
        )
    }
}

use crate::decode::Frame;
use crate::reading::{Classification, Reading};
use tracing::{debug, warn};

/// Highest humidity the sensor can legitimately report.
pub const MAX_HUMIDITY: f32 = 99.9;

/// Largest change in humidity (percentage points) or temperature (degrees Celsius) accepted
/// against a baseline reading.
pub const MAX_DELTA: f32 = 5.0;

/// Classifies a decoded frame.
///
/// `persisted` is the last good reading from a previous run, if any. `last_in_process` holds the
/// most recent reading that went through the baseline comparison during this run; it is updated
/// whenever that comparison happens.
pub fn evaluate(
    frame: &Frame,
    persisted: Option<&Reading>,
    last_in_process: &mut Option<Reading>,
) -> Reading {
    evaluate_values(
        frame.humidity(),
        frame.temperature(),
        persisted,
        last_in_process,
    )
}

/// Classifies a humidity/temperature pair. See [`evaluate`].
pub fn evaluate_values(
    humidity: f32,
    temperature: f32,
    persisted: Option<&Reading>,
    last_in_process: &mut Option<Reading>,
) -> Reading {
    if humidity > MAX_HUMIDITY {
        warn!(humidity, "humidity out of range");
        return Reading::new(Classification::Invalid, humidity, temperature);
    }

    if humidity == 0.0 && temperature == 0.0 {
        warn!("humidity and temperature both zero (suspicious)");
        return Reading::new(Classification::AllZero, humidity, temperature);
    }

    let mut reading = Reading::new(Classification::Ok, humidity, temperature);
    let baseline = match persisted {
        Some(baseline) if baseline.is_ok() => baseline,
        _ => return reading,
    };

    if differs(&reading, baseline) {
        // Two consecutive readings that agree with each other outvote a single stale baseline.
        let confirmed = match last_in_process {
            Some(previous) => {
                previous.classification == Classification::Inconsistent
                    && !differs(&reading, previous)
            }
            None => false,
        };
        if confirmed {
            debug!(
                humidity,
                temperature, "previous reading confirms the change from the stored baseline"
            );
        } else {
            warn!(
                humidity,
                temperature,
                baseline_humidity = baseline.humidity,
                baseline_temperature = baseline.temperature,
                "reading is inconsistent with the stored baseline"
            );
            reading.classification = Classification::Inconsistent;
        }
    }

    *last_in_process = Some(reading);
    reading
}

/// Compares in whole tenths, the sensor's resolution, so that a change of exactly
/// [`MAX_DELTA`] is not pushed over the limit by float rounding.
fn differs(a: &Reading, b: &Reading) -> bool {
    let max_delta_tenths = tenths(MAX_DELTA);
    (tenths(a.humidity) - tenths(b.humidity)).abs() > max_delta_tenths
        || (tenths(a.temperature) - tenths(b.temperature)).abs() > max_delta_tenths
}

fn tenths(value: f32) -> i32 {
    (value * 10.0).round() as i32
}

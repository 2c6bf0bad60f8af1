use crate::capture::capture;
use crate::decode::decode;
use crate::error::Error;
use crate::evaluate::evaluate;
use crate::line::Line;
use crate::reading::{Classification, Reading};
use core::time::Duration;
use tracing::{debug, info, warn};

/// Number of all-zero readings after which the zeros are accepted as genuine.
const ZERO_READINGS_ACCEPTED: u32 = 2;

/// Options to modify the behavior of the acquisition controller.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// The number of attempts that may fail before giving up. Must be at least 1.
    ///
    /// All-zero readings do not use up an attempt unless they repeat.
    pub tries: u32,
    /// How long to wait after a failed attempt before trying again.
    pub retry_delay: Duration,
    /// How long to wait once acquisition has finished, so that a following run does not wake the
    /// sensor before it is ready.
    pub settle_delay: Duration,
}

pub const DEFAULT_OPTIONS: Options = Options {
    tries: 100,
    retry_delay: Duration::from_millis(1000),
    settle_delay: Duration::from_millis(1500),
};

impl Default for Options {
    fn default() -> Self {
        DEFAULT_OPTIONS
    }
}

/// What the controller should do after an attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    /// Stop with this reading.
    Done(Reading),
    /// Try again straight away without spending an attempt.
    RetryNow(Reading),
    /// Spend an attempt, then back off before trying again.
    Retry(Reading),
}

/// Drives repeated capture, decode and evaluate cycles until a trustworthy reading is found or
/// the attempt budget runs out.
#[derive(Debug)]
pub struct Controller<L: Line> {
    line: L,
    options: Options,
    persisted: Option<Reading>,
    last_in_process: Option<Reading>,
    zero_count: u32,
    attempts: u32,
}

impl<L: Line> Controller<L> {
    /// Constructs a controller reading from the given line.
    ///
    /// `persisted` is the last good reading stored by a previous run, used as the baseline for
    /// consistency checks. If `options` is `None`, [`DEFAULT_OPTIONS`] is used.
    pub fn new(
        line: L,
        options: Option<Options>,
        persisted: Option<Reading>,
    ) -> Result<Controller<L>, Error<L::Error>> {
        let options = options.unwrap_or(DEFAULT_OPTIONS);
        if options.tries < 1 {
            return Err(Error::InvalidArgument("tries must be at least 1"));
        }
        Ok(Controller {
            line,
            options,
            persisted,
            last_in_process: None,
            zero_count: 0,
            attempts: 0,
        })
    }

    /// Number of capture cycles performed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn into_line(self) -> L {
        self.line
    }

    /// Runs until a reading classified [`Classification::Ok`] is obtained or the budget is spent.
    ///
    /// When the budget runs out, the last reading is returned whatever its classification, so
    /// callers must check [`Reading::is_ok`].
    pub fn run(&mut self) -> Result<Reading, Error<L::Error>> {
        let mut remaining = self.options.tries;
        let result = loop {
            let reading = match self.step()? {
                Step::Done(reading) => break reading,
                Step::RetryNow(reading) => {
                    debug!("retrying without using an attempt");
                    reading
                }
                Step::Retry(reading) => {
                    remaining -= 1;
                    if remaining > 0 {
                        self.sleep(self.options.retry_delay);
                    }
                    reading
                }
            };
            if remaining == 0 {
                warn!(attempts = self.attempts, "no attempts left");
                break reading;
            }
        };
        self.sleep(self.options.settle_delay);
        Ok(result)
    }

    /// Performs one capture cycle and decides what happens next.
    fn step(&mut self) -> Result<Step, Error<L::Error>> {
        self.attempts += 1;
        debug!(attempt = self.attempts, "reading values");

        let record = capture(&mut self.line)?;
        let reading = match decode(&record) {
            Ok(frame) => evaluate(&frame, self.persisted.as_ref(), &mut self.last_in_process),
            Err(failure) => {
                warn!(%failure, "data not good, skipping");
                Reading::bad_data()
            }
        };

        Ok(match reading.classification {
            Classification::Ok => Step::Done(reading),
            Classification::AllZero => {
                self.zero_count += 1;
                if self.zero_count >= ZERO_READINGS_ACCEPTED {
                    info!("repeated zero reading, accepting it");
                    Step::Done(Reading {
                        classification: Classification::Ok,
                        ..reading
                    })
                } else {
                    Step::RetryNow(reading)
                }
            }
            Classification::BadData | Classification::Inconsistent | Classification::Invalid => {
                Step::Retry(reading)
            }
        })
    }

    fn sleep(&mut self, duration: Duration) {
        let ms = duration.as_millis().min(u32::MAX as u128) as u32;
        if ms > 0 {
            self.line.sleep_ms(ms);
        }
    }
}

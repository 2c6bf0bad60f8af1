use core::fmt::Debug;
use embedded_hal::digital::blocking::{InputPin, IoPin, OutputPin};
use thiserror::Error;

/// Electrical level of the data line.
pub use embedded_hal::digital::PinState as Level;

/// Direction the data line is configured for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// The minimal GPIO capability needed to talk to a DHT sensor.
///
/// Sleeps are blocking. Implementations used for real hardware should make `sleep_us` as close to
/// one microsecond as the platform allows, since capture counts polls rather than measuring time.
pub trait Line {
    type Error: Debug;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
    fn write(&mut self, level: Level) -> Result<(), Self::Error>;
    fn read(&mut self) -> Result<Level, Self::Error>;
    fn sleep_us(&mut self, us: u32);
    fn sleep_ms(&mut self, ms: u32);
}

#[derive(Debug, PartialEq, Error)]
pub enum HalLineError<TError: Debug> {
    /// Wrapped error from the HAL.
    #[error("pin error: {0:?}")]
    Pin(TError),
    /// The operation needs the line in the other direction.
    #[error("line must be in {0:?} mode")]
    WrongDirection(Direction),
}

/// A [`Line`] built from an embedded-hal pin that can swap between input and output modes.
///
/// Exactly one of `input_pin` and `output_pin` is populated at any time; the other mode is
/// reached by consuming the pin through [`IoPin`].
#[derive(Debug)]
pub struct HalLine<TInputPin, TOutputPin, DelayUsFn, DelayMsFn>
where
    DelayUsFn: FnMut(u32),
    DelayMsFn: FnMut(u32),
{
    input_pin: Option<TInputPin>,
    output_pin: Option<TOutputPin>,
    delay_us_fn: DelayUsFn,
    delay_ms_fn: DelayMsFn,
}

impl<TInputPin, TOutputPin, TError, DelayUsFn, DelayMsFn>
    HalLine<TInputPin, TOutputPin, DelayUsFn, DelayMsFn>
where
    TInputPin: InputPin<Error = TError> + IoPin<TInputPin, TOutputPin, Error = TError>,
    TOutputPin: OutputPin<Error = TError> + IoPin<TInputPin, TOutputPin, Error = TError>,
    TError: Debug,
    DelayUsFn: FnMut(u32),
    DelayMsFn: FnMut(u32),
{
    /// Wraps a pin that is currently in output mode.
    ///
    /// The delay closures must block for (at least) the given number of microseconds and
    /// milliseconds respectively.
    pub fn new(
        pin: TOutputPin,
        delay_us_fn: DelayUsFn,
        delay_ms_fn: DelayMsFn,
    ) -> HalLine<TInputPin, TOutputPin, DelayUsFn, DelayMsFn> {
        HalLine {
            input_pin: None,
            output_pin: Some(pin),
            delay_us_fn,
            delay_ms_fn,
        }
    }

    pub fn direction(&self) -> Direction {
        if self.output_pin.is_some() {
            Direction::Output
        } else {
            Direction::Input
        }
    }

    fn swap_to_input_mode(&mut self) -> Result<(), HalLineError<TError>> {
        if let Some(output_pin) = self.output_pin.take() {
            self.input_pin = Some(output_pin.into_input_pin().map_err(HalLineError::Pin)?);
        }
        Ok(())
    }

    fn swap_to_output_mode(&mut self) -> Result<(), HalLineError<TError>> {
        if let Some(input_pin) = self.input_pin.take() {
            self.output_pin = Some(
                input_pin
                    .into_output_pin(Level::High)
                    .map_err(HalLineError::Pin)?,
            );
        }
        Ok(())
    }
}

impl<TInputPin, TOutputPin, TError, DelayUsFn, DelayMsFn> Line
    for HalLine<TInputPin, TOutputPin, DelayUsFn, DelayMsFn>
where
    TInputPin: InputPin<Error = TError> + IoPin<TInputPin, TOutputPin, Error = TError>,
    TOutputPin: OutputPin<Error = TError> + IoPin<TInputPin, TOutputPin, Error = TError>,
    TError: Debug,
    DelayUsFn: FnMut(u32),
    DelayMsFn: FnMut(u32),
{
    type Error = HalLineError<TError>;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            Direction::Input => self.swap_to_input_mode(),
            Direction::Output => self.swap_to_output_mode(),
        }
    }

    fn write(&mut self, level: Level) -> Result<(), Self::Error> {
        let output_pin = self
            .output_pin
            .as_mut()
            .ok_or(HalLineError::WrongDirection(Direction::Output))?;
        match level {
            Level::High => output_pin.set_high(),
            Level::Low => output_pin.set_low(),
        }
        .map_err(HalLineError::Pin)
    }

    fn read(&mut self) -> Result<Level, Self::Error> {
        let input_pin = self
            .input_pin
            .as_ref()
            .ok_or(HalLineError::WrongDirection(Direction::Input))?;
        if input_pin.is_high().map_err(HalLineError::Pin)? {
            Ok(Level::High)
        } else {
            Ok(Level::Low)
        }
    }

    #[inline]
    fn sleep_us(&mut self, us: u32) {
        (self.delay_us_fn)(us)
    }

    fn sleep_ms(&mut self, ms: u32) {
        (self.delay_ms_fn)(ms)
    }
}

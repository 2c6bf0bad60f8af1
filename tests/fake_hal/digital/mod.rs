use super::concurrent;
use embedded_hal::digital::blocking::{InputPin, IoPin, OutputPin};
use embedded_hal::digital::PinState;

#[derive(Debug, PartialEq)]
pub enum Error {}

/// A pin that replays a fixed sequence of levels, one per read, then holds `default_data`.
///
/// The read position lives in a named global so that it can be advanced through `&self`.
#[derive(Debug)]
pub struct Pin {
    data_to_read: Option<Vec<u8>>,
    name: &'static str,
    default_data: bool,
}

impl Pin {
    pub fn new(name: &'static str) -> Pin {
        concurrent::set_named_value(name, 0);
        Pin {
            data_to_read: None,
            name: name,
            default_data: true,
        }
    }

    pub fn set_default_data(&mut self, default: bool) {
        self.default_data = default;
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data_to_read = Some(data);
        concurrent::set_named_value(&self.name, 0);
    }

    fn next_level(&self) -> bool {
        let data_index = concurrent::get_and_increment_named_value(&self.name);
        match self.data_to_read.as_ref() {
            Some(data) if data_index < data.len() => data[data_index] > 0,
            _ => self.default_data,
        }
    }
}

impl InputPin for Pin {
    type Error = Error;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.next_level())
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(!self.next_level())
    }
}

impl OutputPin for Pin {
    type Error = Error;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        return Ok(());
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        return Ok(());
    }
}

impl IoPin<Pin, Pin> for Pin {
    type Error = Error;

    fn into_input_pin(self) -> Result<Pin, Self::Error> {
        Ok(self)
    }

    fn into_output_pin(self, _state: PinState) -> Result<Pin, Self::Error> {
        Ok(self)
    }
}

/// Converts a waveform into the per-read levels the capture loop will observe.
///
/// The loop spends one read on each level change and one more on re-reading the new level, so
/// every segment after the first is preceded by two extra samples.
pub fn samples_for(segments: &[(PinState, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    for (i, (level, ticks)) in segments.iter().enumerate() {
        let sample = if *level == PinState::High { 1 } else { 0 };
        let count = if i == 0 { *ticks } else { *ticks + 2 };
        data.extend(std::iter::repeat(sample).take(count as usize));
    }
    data
}

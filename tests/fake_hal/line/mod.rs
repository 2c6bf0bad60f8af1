use dht_sentinel::line::{Direction, Level, Line};
use std::collections::VecDeque;

/// Held level and duration, in polling ticks.
pub type Segment = (Level, u32);

const ZERO_BIT_TICKS: u32 = 8;
const ONE_BIT_TICKS: u32 = 24;

#[derive(Debug, PartialEq)]
pub enum Error {
    NotInput,
    NotOutput,
}

/// A line whose level follows a scripted waveform per capture.
///
/// Time only advances through `sleep_us` while in input mode, so one poll of the capture loop
/// equals one tick of the waveform. Each switch to input mode starts the next waveform; once the
/// waveforms run out, or a waveform ends, the line idles high.
#[derive(Debug, Default)]
pub struct ScriptedLine {
    waveforms: VecDeque<Vec<Segment>>,
    current: Vec<Segment>,
    now: u32,
    input: bool,
    pub captures: u32,
    /// Millisecond sleeps taken while listening, i.e. between and after captures.
    pub sleeps_ms: Vec<u32>,
    pub writes: Vec<Level>,
}

impl ScriptedLine {
    pub fn new(waveforms: Vec<Vec<Segment>>) -> ScriptedLine {
        ScriptedLine {
            waveforms: waveforms.into(),
            ..ScriptedLine::default()
        }
    }

    fn level_now(&self) -> Level {
        let mut end = 0;
        for (level, ticks) in self.current.iter() {
            end += ticks;
            if self.now < end {
                return *level;
            }
        }
        Level::High
    }
}

impl Line for ScriptedLine {
    type Error = Error;

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            Direction::Input => {
                self.input = true;
                self.captures += 1;
                self.now = 0;
                self.current = self.waveforms.pop_front().unwrap_or_default();
            }
            Direction::Output => self.input = false,
        }
        Ok(())
    }

    fn write(&mut self, level: Level) -> Result<(), Self::Error> {
        if self.input {
            return Err(Error::NotOutput);
        }
        self.writes.push(level);
        Ok(())
    }

    fn read(&mut self) -> Result<Level, Self::Error> {
        if !self.input {
            return Err(Error::NotInput);
        }
        Ok(self.level_now())
    }

    fn sleep_us(&mut self, us: u32) {
        if self.input {
            self.now += us;
        }
    }

    fn sleep_ms(&mut self, ms: u32) {
        // Wake-up sleeps happen in output mode; only the waits after a capture are of interest.
        if self.input {
            self.sleeps_ms.push(ms);
        }
    }
}

/// The waveform a healthy sensor sends for these five bytes.
pub fn waveform(bytes: [u8; 5]) -> Vec<Segment> {
    // Release, then the sensor's acknowledge low and high.
    let mut segments = vec![(Level::High, 10), (Level::Low, 27), (Level::High, 27)];
    for byte in bytes.iter() {
        for i in 0..8 {
            segments.push((Level::Low, 16));
            if byte & (1 << (7 - i)) != 0 {
                segments.push((Level::High, ONE_BIT_TICKS));
            } else {
                segments.push((Level::High, ZERO_BIT_TICKS));
            }
        }
    }
    segments.push((Level::Low, 16));
    segments
}

/// The waveform for a reading with a correct checksum. Temperature is in tenths of a degree.
pub fn reading_waveform(humidity_x10: u16, temperature_x10: i16) -> Vec<Segment> {
    let humidity = humidity_x10.to_be_bytes();
    let mut temperature = temperature_x10.unsigned_abs().to_be_bytes();
    if temperature_x10 < 0 {
        temperature[0] |= 0x80;
    }
    let sum = humidity[0] as u16 + humidity[1] as u16 + temperature[0] as u16 + temperature[1] as u16;
    waveform([
        humidity[0],
        humidity[1],
        temperature[0],
        temperature[1],
        sum.to_be_bytes()[1],
    ])
}

/// A sensor that never answers: the line idles high.
pub fn silence() -> Vec<Segment> {
    Vec::new()
}

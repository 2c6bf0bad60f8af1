use crate::error::Error;
use crate::line::{Direction, Level, Line};

/// Maximum number of level transitions observed in one capture.
pub const MAX_TRANSITIONS: usize = 85;

/// Poll count at which a window is considered to have seen no transition.
pub const TICK_CEILING: u8 = 0xFF;

/// Transitions belonging to the sensor's response preamble rather than to data bits.
const PREAMBLE_TRANSITIONS: usize = 4;

const WAKE_HIGH_DURATION_MS: u32 = 10;
const WAKE_LOW_DURATION_MS: u32 = 18;
const RELEASE_DURATION_US: u32 = 40;

/// One observed level and how many polls it was held for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub level: Level,
    pub ticks: u8,
}

/// The level transitions seen during a single capture, in order.
#[derive(Clone, Debug)]
pub struct TransitionRecord {
    transitions: [Transition; MAX_TRANSITIONS],
    len: usize,
}

impl TransitionRecord {
    pub fn new() -> TransitionRecord {
        TransitionRecord {
            transitions: [Transition {
                level: Level::High,
                ticks: 0,
            }; MAX_TRANSITIONS],
            len: 0,
        }
    }

    /// Appends a transition. Returns `false` once the record is full.
    pub fn push(&mut self, level: Level, ticks: u8) -> bool {
        if self.len >= MAX_TRANSITIONS {
            return false;
        }
        self.transitions[self.len] = Transition { level, ticks };
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions[..self.len]
    }

    /// The transitions that each carry one data bit: every other one, starting after the
    /// preamble.
    pub fn data_pulses(&self) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i >= PREAMBLE_TRANSITIONS && i % 2 == 0)
            .map(|(_, transition)| transition)
    }
}

impl Default for TransitionRecord {
    fn default() -> Self {
        TransitionRecord::new()
    }
}

/// Wakes the sensor and records the level transitions of its response.
///
/// The line is left in input mode. A short record (fewer than 40 data pulses) is not an error
/// here; the decoder rejects it.
pub fn capture<L: Line>(line: &mut L) -> Result<TransitionRecord, Error<L::Error>> {
    request_data(line)?;
    receive_transitions(line)
}

fn request_data<L: Line>(line: &mut L) -> Result<(), Error<L::Error>> {
    line.set_direction(Direction::Output)?;
    line.write(Level::High)?;
    line.sleep_ms(WAKE_HIGH_DURATION_MS);
    line.write(Level::Low)?;
    line.sleep_ms(WAKE_LOW_DURATION_MS);
    line.write(Level::High)?;
    line.sleep_us(RELEASE_DURATION_US);
    line.set_direction(Direction::Input)?;
    Ok(())
}

fn receive_transitions<L: Line>(line: &mut L) -> Result<TransitionRecord, Error<L::Error>> {
    let mut record = TransitionRecord::new();
    let mut last_level = Level::High;

    for _ in 0..MAX_TRANSITIONS {
        let mut ticks = 0u8;
        while line.read()? == last_level {
            ticks += 1;
            line.sleep_us(1);
            if ticks == TICK_CEILING {
                break;
            }
        }
        let held_level = last_level;
        last_level = line.read()?;

        if ticks == TICK_CEILING {
            break;
        }
        record.push(held_level, ticks);
    }

    Ok(record)
}

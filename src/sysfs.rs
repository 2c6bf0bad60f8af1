use embedded_hal::digital::blocking::{InputPin, IoPin, OutputPin};
use embedded_hal::digital::PinState;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the kernel exposes the sysfs GPIO interface.
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// A GPIO pin driven through the Linux sysfs interface.
///
/// The same type serves as both the input and the output side of [`IoPin`]; switching modes
/// rewrites the pin's `direction` file.
#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    dir: PathBuf,
    value: File,
}

impl SysfsPin {
    /// Opens `number` under `root` in output mode, driven high, exporting it first if needed.
    pub fn open(root: &Path, number: u32) -> io::Result<SysfsPin> {
        let dir = root.join(format!("gpio{}", number));
        if !dir.exists() {
            debug!(number, "exporting pin");
            fs::write(root.join("export"), number.to_string())?;
        }
        let value = OpenOptions::new()
            .read(true)
            .write(true)
            .open(dir.join("value"))?;
        let pin = SysfsPin { number, dir, value };
        pin.set_direction(PinState::High)?;
        Ok(pin)
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Configures the pin as an output starting at `state`.
    fn set_direction(&self, state: PinState) -> io::Result<()> {
        let direction = match state {
            PinState::High => "high",
            PinState::Low => "low",
        };
        fs::write(self.dir.join("direction"), direction)
    }

    fn write_value(&self, value: &[u8]) -> io::Result<()> {
        let mut file = &self.value;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(value)
    }

    fn read_value(&self) -> io::Result<bool> {
        let mut file = &self.value;
        file.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; 1];
        file.read_exact(&mut buf)?;
        Ok(buf[0] == b'1')
    }
}

impl InputPin for SysfsPin {
    type Error = io::Error;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.read_value()
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.read_value().map(|high| !high)
    }
}

impl OutputPin for SysfsPin {
    type Error = io::Error;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_value(b"0")
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_value(b"1")
    }
}

impl IoPin<SysfsPin, SysfsPin> for SysfsPin {
    type Error = io::Error;

    fn into_input_pin(self) -> Result<SysfsPin, Self::Error> {
        fs::write(self.dir.join("direction"), "in")?;
        Ok(self)
    }

    fn into_output_pin(self, state: PinState) -> Result<SysfsPin, Self::Error> {
        self.set_direction(state)?;
        Ok(self)
    }
}

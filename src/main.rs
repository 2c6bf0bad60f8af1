use anyhow::{Context, Result};
use clap::Parser;
use dht_sentinel::line::HalLine;
use dht_sentinel::lock::{DeviceLock, DEFAULT_LOCK_DIR};
use dht_sentinel::persist::{FileStore, ReadingStore, DEFAULT_STATE_DIR};
use dht_sentinel::sysfs::{SysfsPin, DEFAULT_GPIO_ROOT};
use dht_sentinel::{Controller, Options, DEFAULT_OPTIONS};
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// BCM GPIO 4, the pin most DHT22 wiring guides use.
const DEFAULT_PIN: u8 = 4;

#[derive(Parser, Debug)]
#[command(name = "dht-sentinel")]
#[command(about = "Reads a DHT22 sensor and sanity checks the result", long_about = None)]
struct Cli {
    /// GPIO pin the sensor's data line is connected to (BCM numbering, default 4)
    #[arg(value_name = "PIN")]
    pin: Option<u8>,

    /// Number of attempts to make before giving up
    #[arg(value_name = "TRIES", allow_negative_numbers = true)]
    tries: Option<i64>,

    /// Directory holding the per-sensor lock files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_LOCK_DIR)]
    lock_dir: PathBuf,

    /// Directory holding the last good reading of each sensor
    #[arg(long, value_name = "DIR", default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    /// Root of the sysfs GPIO interface
    #[arg(long, value_name = "DIR", default_value = DEFAULT_GPIO_ROOT)]
    gpio_root: PathBuf,

    /// Milliseconds to wait between failed attempts
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_OPTIONS.retry_delay.as_millis() as u64)]
    retry_delay_ms: u64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let pin = match cli.pin {
        Some(pin) => {
            info!(pin, "setting sensor pin");
            pin
        }
        None => {
            eprintln!("Usage: dht-sentinel <pin> [<tries>]");
            eprintln!("Description:");
            eprintln!("\tPin is the BCM GPIO number (default {}).", DEFAULT_PIN);
            eprintln!(
                "\tTries is the number of times to try to obtain a read (default {}) [Optional]",
                DEFAULT_OPTIONS.tries
            );
            DEFAULT_PIN
        }
    };

    let tries = cli.tries.unwrap_or(DEFAULT_OPTIONS.tries as i64);
    if tries < 1 || tries > u32::MAX as i64 {
        anyhow::bail!("invalid tries supplied: {}", tries);
    }
    info!(tries, "attempts will be made");
    let options = Options {
        tries: tries as u32,
        retry_delay: Duration::from_millis(cli.retry_delay_ms),
        ..DEFAULT_OPTIONS
    };

    let lock = DeviceLock::acquire(&cli.lock_dir, pin)?;

    let gpio = SysfsPin::open(&cli.gpio_root, pin as u32)
        .with_context(|| format!("problem setting up GPIO {}", pin))?;
    let line = HalLine::<SysfsPin, SysfsPin, _, _>::new(
        gpio,
        |us: u32| spin_for(Duration::from_micros(us as u64)),
        |ms: u32| sleep(Duration::from_millis(ms as u64)),
    );

    let store = FileStore::new(&cli.state_dir);
    let persisted = store.load(pin).unwrap_or_else(|err| {
        warn!(%err, "ignoring stored reading");
        None
    });

    let mut controller = Controller::new(line, Some(options), persisted)?;
    info!("beginning read attempts");
    let reading = controller
        .run()
        .context("reading from the sensor failed")?;

    if reading.is_ok() {
        println!(
            "Humidity = {:.2} % Temperature = {:.2} *C ({:.2} *F)",
            reading.humidity,
            reading.temperature,
            reading.fahrenheit()
        );
        if let Err(err) = store.store(pin, &reading) {
            warn!(%err, "failed to store reading");
        }
    } else {
        warn!(attempts = controller.attempts(), last = %reading, "giving up");
        eprintln!("Values could not be obtained.");
    }

    lock.release()?;
    Ok(())
}

/// Busy-waits, since `thread::sleep` cannot resolve single microseconds.
fn spin_for(duration: Duration) {
    let start = std::time::Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}

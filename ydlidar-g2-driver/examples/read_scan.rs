use clap::Parser;
use std::time::Duration;
use ydlidar_g2_driver::{DriverConfig, ScanSession};

/// Reads data from LiDAR and prints one line per revolution.
#[derive(Parser)]
#[command(about, disable_version_flag = true)]
struct Args {
    /// The device path to a serial port
    port: String,
    /// Number of revolutions to read
    #[arg(short, long, default_value_t = 10)]
    revolutions: usize,
    /// Serial read timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,
    /// Skip forward to the next preamble after a corrupt header
    #[arg(long)]
    resync: bool,
    /// Print revolutions as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = DriverConfig::default()
        .with_read_timeout(Duration::from_millis(args.timeout_ms))
        .with_resync(args.resync);
    let mut session = ScanSession::open(&args.port, config)?;

    let info = session.device_info()?;
    println!(
        "{:?} firmware {} hardware {} serial {}",
        info.model(),
        info.firmware_version(),
        info.hardware_version,
        info.serial_number_string()
    );
    session.check_device_health()?;

    let scans = session.start_scan()?.revolutions().take(args.revolutions);
    for scan in scans {
        if args.json {
            println!("{}", serde_json::to_string(&scan)?);
        } else {
            println!(
                "{} points at {:?} Hz, {} dropped frames",
                scan.len(),
                scan.frequency_hz,
                scan.dropped_frames
            );
        }
    }

    session.stop_scan()?;
    Ok(())
}

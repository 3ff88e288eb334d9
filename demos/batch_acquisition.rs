// Batch acquisition example
//
// Collects batches of gauge readings in either read mode. Pair it with the
// microcontroller test-signal simulator for a hardware-free dry run.

use clap::Parser;
use lasergauge_rs::{GaugeConnector, ReadMode, TimeoutPolicy, BATCH_SIZE};

#[derive(Parser)]
#[command(name = "batch_acquisition")]
#[command(about = "Acquire batches of readings from a LaserGauge device")]
struct Args {
    /// Serial port of the gauge (first enumerated device if omitted)
    #[arg(short, long)]
    port: Option<String>,

    /// Read mode: passive or active
    #[arg(short, long, default_value = "passive")]
    mode: String,

    /// Abort the batch on an active-mode timeout instead of retrying
    #[arg(long)]
    abort_on_timeout: bool,

    /// Number of batches to acquire
    #[arg(short, long, default_value_t = 1)]
    batches: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let mode: ReadMode = args.mode.parse()?;

    println!("LaserGauge Batch Acquisition");
    println!("============================");
    println!("Mode: {mode}\n");

    let mut gauge = GaugeConnector::connect(args.port.as_deref(), mode)?;
    if args.abort_on_timeout {
        gauge.set_timeout_policy(TimeoutPolicy::Abort);
    }

    for n in 1..=args.batches {
        println!("Acquiring batch {n} ({BATCH_SIZE} readings)...");
        let batch = gauge.acquire_batch()?;

        println!("      west   center  east");
        for (i, record) in (&batch).into_iter().enumerate() {
            println!(
                "  {:2}  {:<7.3}{:<8.3}{:<7.3}",
                i + 1,
                record.west,
                record.center,
                record.east
            );
        }
        println!();
    }

    gauge.disconnect();
    Ok(())
}

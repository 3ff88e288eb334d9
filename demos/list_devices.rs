// Device discovery example
//
// Lists all USB serial ports that could be the gauge, with the metadata the
// transport layer reports about them.

use lasergauge_rs::GaugeConnector;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("LaserGauge Device Discovery");
    println!("===========================\n");

    let devices = GaugeConnector::get_available_devices()?;

    if devices.is_empty() {
        println!("No serial devices found. Please connect the gauge and try again.");
        return Ok(());
    }

    println!("Found {} device(s):", devices.len());
    for (i, device) in devices.iter().enumerate() {
        println!("  {}. {}", i + 1, device);
    }

    Ok(())
}

// Basic connection example
//
// Connects to the first available device, prints the effective connection
// settings and checks that the session stays alive.

use lasergauge_rs::{GaugeConnector, ReadMode};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("LaserGauge Connection Example");
    println!("=============================\n");

    println!("1. Connecting to first available device...");
    let gauge = GaugeConnector::connect(None, ReadMode::Passive)?;
    println!("Successfully connected!");

    println!("\n2. Connection settings:");
    let config = gauge.get_config();
    println!("   Port:           {}", config.port_name);
    println!("   Baudrate:       {}", config.baud_rate);
    println!("   Separator:      {:?}", config.separator);
    println!("   Read mode:      {}", config.mode);
    println!("   Read timeout:   {:?}", config.read_timeout);
    println!("   Timeout policy: {:?}", config.timeout_policy);

    println!("\n3. Liveness check:");
    println!("   is_alive = {}", gauge.is_alive());

    gauge.disconnect();
    println!("\n4. Session released.");

    Ok(())
}

use crate::acquisition::{GaugeHandle, ReadMode};
use serialport::{ClearBuffer, SerialPortType};
use std::fmt;
use std::time::Duration;

/// Baudrate the gauge's serial bridge runs at.
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Poll interval on the raw port; blocking reads are built on top of this
/// in the framer.
const PORT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// One USB serial port that may be the gauge, with the metadata the
/// transport layer reports about it.
#[derive(Debug, Clone)]
pub struct GaugeDevice {
    pub port: String,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl fmt::Display for GaugeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{:04x}:{:04x}] {} ({})",
            self.port,
            self.vendor_id,
            self.product_id,
            self.description.as_deref().unwrap_or("unknown device"),
            self.manufacturer.as_deref().unwrap_or("unknown vendor"),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GaugeConnectorError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Empty port name")]
    EmptyPortName,

    #[error("Port {port} is not an available serial device")]
    InvalidPort { port: String },

    #[error("No gauge device found. Please connect the instrument or specify the port manually")]
    NoDeviceFound,
}

pub struct GaugeConnector;

impl GaugeConnector {
    /// Connect to the gauge, on the given port or on the first enumerated
    /// candidate. The handle comes back in `mode` with the default line
    /// separator already configured.
    pub fn connect(
        port: Option<&str>,
        mode: ReadMode,
    ) -> Result<GaugeHandle, GaugeConnectorError> {
        Self::connect_with_baudrate(port, mode, DEFAULT_BAUDRATE)
    }

    pub fn connect_with_baudrate(
        port: Option<&str>,
        mode: ReadMode,
        baud_rate: u32,
    ) -> Result<GaugeHandle, GaugeConnectorError> {
        let port_name = if let Some(port) = port {
            if port.is_empty() {
                return Err(GaugeConnectorError::EmptyPortName);
            }
            Self::validate_port(port)?;
            port.to_string()
        } else {
            Self::pick_device_port()?
        };

        log::debug!("Connecting to gauge on port {port_name}");
        let serial = serialport::new(port_name.as_str(), baud_rate)
            .timeout(PORT_POLL_TIMEOUT)
            .open()?;

        // Drop whatever the instrument pushed before we were listening.
        serial.clear(ClearBuffer::All)?;

        Ok(GaugeHandle::from_transport(
            serial, &port_name, baud_rate, mode,
        ))
    }

    /// Validate that a given port is among the enumerated serial devices.
    fn validate_port(port: &str) -> Result<(), GaugeConnectorError> {
        let known = serialport::available_ports()?;
        if !known.iter().any(|p| p.port_name == port) {
            return Err(GaugeConnectorError::InvalidPort {
                port: port.to_string(),
            });
        }
        Ok(())
    }

    /// All USB serial ports that may be the gauge, with their metadata.
    pub fn get_available_devices() -> Result<Vec<GaugeDevice>, GaugeConnectorError> {
        let mut devices = Vec::new();

        for port in serialport::available_ports()? {
            if let SerialPortType::UsbPort(usb) = port.port_type {
                devices.push(GaugeDevice {
                    port: port.port_name,
                    description: usb.product,
                    manufacturer: usb.manufacturer,
                    vendor_id: usb.vid,
                    product_id: usb.pid,
                });
            }
        }

        Ok(devices)
    }

    fn pick_device_port() -> Result<String, GaugeConnectorError> {
        log::debug!("Searching for a gauge device");
        Self::get_available_devices()?
            .into_iter()
            .next()
            .map(|device| device.port)
            .ok_or(GaugeConnectorError::NoDeviceFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_available_devices() {
        // Depends on what is actually plugged in; only check that whatever
        // comes back is well-formed.
        let devices = GaugeConnector::get_available_devices().unwrap();
        for device in devices {
            assert!(!device.port.is_empty());
        }
    }

    #[test]
    fn test_empty_port_name_rejected_before_opening() {
        assert!(matches!(
            GaugeConnector::connect(Some(""), ReadMode::Passive),
            Err(GaugeConnectorError::EmptyPortName)
        ));
    }

    #[test]
    fn test_unknown_port_rejected() {
        let result = GaugeConnector::connect(Some("/dev/ttyNOSUCH99"), ReadMode::Passive);
        assert!(matches!(
            result,
            Err(GaugeConnectorError::InvalidPort { .. }) | Err(GaugeConnectorError::Serial(_))
        ));
    }

    #[test]
    fn test_device_display_with_missing_metadata() {
        let device = GaugeDevice {
            port: "/dev/ttyUSB0".to_string(),
            description: None,
            manufacturer: None,
            vendor_id: 0x0403,
            product_id: 0x6001,
        };
        let rendered = device.to_string();
        assert!(rendered.contains("/dev/ttyUSB0"));
        assert!(rendered.contains("0403:6001"));
    }
}

//! # LaserGauge RS
//!
//! A Rust library for acquiring distance readings from a 3-channel laser
//! gauge over a line-framed serial link.
//!
//! The instrument emits one reading per line: three tab-separated decimal
//! values for its west, center and east channels. This library connects to
//! the gauge, frames the incoming byte stream into discrete messages, parses
//! each message into a [`Record`], and collects fixed-size batches of
//! readings.
//!
//! ## Features
//!
//! - **Device discovery**: Uses `serialport` for enumerating candidate ports
//! - **Line framing**: Configurable message separator (CRLF by default)
//! - **Read modes**: Passive (polled) and active (push with bounded waits)
//! - **Batch acquisition**: Exactly [`BATCH_SIZE`] records per call in
//!   arrival order, or a tagged error; never a partial batch
//! - **Type safety**: Closed mode/policy types and error enums throughout
//!
//! ## Examples
//!
//! ### Connection and batch acquisition
//!
//! ```rust,no_run
//! use lasergauge_rs::{GaugeConnector, ReadMode};
//!
//! // Connect to the first available device, polled mode
//! let mut gauge = GaugeConnector::connect(None, ReadMode::Passive)?;
//!
//! let batch = gauge.acquire_batch()?;
//! for record in &batch {
//!     println!("{:.3} {:.3} {:.3}", record.west, record.center, record.east);
//! }
//!
//! gauge.disconnect();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Parsing a raw gauge line
//!
//! ```rust
//! use lasergauge_rs::Record;
//!
//! let record: Record = "0.369\t0.398\t0.392".parse()?;
//! assert_eq!(record.west, 0.369);
//! assert_eq!(record.center, 0.398);
//! assert_eq!(record.east, 0.392);
//! # Ok::<(), lasergauge_rs::RecordParseError>(())
//! ```
//!
//! ### Active mode with an explicit timeout policy
//!
//! ```rust,no_run
//! use lasergauge_rs::{GaugeConnector, ReadMode, TimeoutPolicy};
//!
//! let mut gauge = GaugeConnector::connect(Some("/dev/ttyUSB0"), ReadMode::Active)?;
//! gauge.set_timeout_policy(TimeoutPolicy::Abort);
//!
//! let batch = gauge.acquire_batch()?;
//! println!("Collected {} readings", batch.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Device discovery
//!
//! ```rust,no_run
//! use lasergauge_rs::GaugeConnector;
//!
//! for device in GaugeConnector::get_available_devices()? {
//!     println!("Found device: {device}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod acquisition;
pub mod gauge_connector;
pub mod line_framer;
pub mod record;

// Re-export the main types for convenience
pub use acquisition::{
    AcquireError, Batch, GaugeConfig, GaugeHandle, InvalidModeError, ReadMode, TimeoutPolicy,
    ACTIVE_READ_TIMEOUT, BATCH_SIZE,
};

pub use gauge_connector::{GaugeConnector, GaugeConnectorError, GaugeDevice, DEFAULT_BAUDRATE};

pub use line_framer::{FramerError, GaugeTransport, LineFramer, DEFAULT_SEPARATOR};

pub use record::{Record, RecordParseError, CHANNEL_COUNT, FIELD_DELIMITER};

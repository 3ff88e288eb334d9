use crate::line_framer::{FramerError, GaugeTransport, LineFramer};
use crate::record::{Record, RecordParseError};
use serialport::SerialPort;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Number of records one acquisition call delivers. The instrument protocol
/// works in fixed batches; there is no partial-batch success.
pub const BATCH_SIZE: usize = 10;

/// How long one active-mode wait may last before it counts as timed out.
pub const ACTIVE_READ_TIMEOUT: Duration = Duration::from_millis(1500);

/// How the connection obtains messages from the instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// The caller synchronously requests each message and blocks until it
    /// arrives. Default after connect.
    #[default]
    Passive,
    /// The instrument pushes messages on its own; each wait for the next one
    /// is bounded by the handle's read timeout.
    Active,
}

impl ReadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadMode::Passive => "passive",
            ReadMode::Active => "active",
        }
    }
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{token:?} is not a read mode, expected \"passive\" or \"active\"")]
pub struct InvalidModeError {
    pub token: String,
}

impl FromStr for ReadMode {
    type Err = InvalidModeError;

    /// Boundary validation for mode tokens arriving as text. Anything other
    /// than `passive`/`active` (case-insensitive) is rejected here, before
    /// it can reach the connection state machine.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_ascii_lowercase().as_str() {
            "passive" => Ok(ReadMode::Passive),
            "active" => Ok(ReadMode::Active),
            _ => Err(InvalidModeError {
                token: token.to_string(),
            }),
        }
    }
}

/// What to do when an active-mode wait times out.
///
/// The instrument's legacy firmware-side tooling logged a timed-out wait and
/// kept waiting, while a passive-mode failure aborts the whole batch. The two
/// policies are deliberately kept distinct and configurable instead of being
/// silently unified; [`TimeoutPolicy::Skip`] is the legacy behavior and the
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Log the timed-out attempt and keep waiting for the next message.
    /// Note that a permanently silent instrument never completes the batch.
    #[default]
    Skip,
    /// Fail the batch with [`AcquireError::Timeout`] on the first timed-out
    /// wait, mirroring how passive-mode failures abort.
    Abort,
}

#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("Framing error: {0}")]
    Framer(#[from] FramerError),

    #[error("Malformed reading: {0}")]
    Parse(#[from] RecordParseError),

    #[error("No reading within {waited:?}")]
    Timeout { waited: Duration },
}

/// One completed acquisition: exactly [`BATCH_SIZE`] records in arrival
/// order. Only constructed by a finished [`GaugeHandle::acquire_batch`] call,
/// so holding a `Batch` is itself the completion marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    fn new(records: Vec<Record>) -> Self {
        debug_assert_eq!(records.len(), BATCH_SIZE);
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for Batch {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Connection settings as currently effective on a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaugeConfig {
    pub port_name: String,
    pub baud_rate: u32,
    pub separator: String,
    pub mode: ReadMode,
    pub read_timeout: Duration,
    pub timeout_policy: TimeoutPolicy,
}

/// One open session with the instrument.
///
/// The handle exclusively owns its transport; one acquisition is in flight
/// at a time (enforced by `&mut self`), and releasing the session consumes
/// the handle, so a released handle cannot be used again.
pub struct GaugeHandle<T: GaugeTransport = Box<dyn SerialPort>> {
    port_name: String,
    baud_rate: u32,
    framer: LineFramer<T>,
    mode: ReadMode,
    read_timeout: Duration,
    timeout_policy: TimeoutPolicy,
}

impl<T: GaugeTransport> GaugeHandle<T> {
    /// Wrap an already-open transport. Configures the default line separator
    /// as part of construction; use [`GaugeHandle::set_separator`] to change
    /// it afterwards.
    pub fn from_transport(transport: T, port_name: &str, baud_rate: u32, mode: ReadMode) -> Self {
        Self {
            port_name: port_name.to_string(),
            baud_rate,
            framer: LineFramer::with_default_separator(transport),
            mode,
            read_timeout: ACTIVE_READ_TIMEOUT,
            timeout_policy: TimeoutPolicy::default(),
        }
    }

    /// Switch between passive and active reading. Takes effect for all
    /// subsequent reads; nothing already read is reinterpreted.
    pub fn set_read_mode(&mut self, mode: ReadMode) {
        log::debug!("Switching {} to {} mode", self.port_name, mode);
        self.mode = mode;
    }

    pub fn read_mode(&self) -> ReadMode {
        self.mode
    }

    /// Reconfigure the line separator for all subsequent messages.
    pub fn set_separator(&mut self, separator: &str) {
        self.framer.set_separator(separator);
    }

    /// Bound for one active-mode wait. Defaults to [`ACTIVE_READ_TIMEOUT`].
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    pub fn set_timeout_policy(&mut self, policy: TimeoutPolicy) {
        self.timeout_policy = policy;
    }

    pub fn get_config(&self) -> GaugeConfig {
        GaugeConfig {
            port_name: self.port_name.clone(),
            baud_rate: self.baud_rate,
            separator: self.framer.separator(),
            mode: self.mode,
            read_timeout: self.read_timeout,
            timeout_policy: self.timeout_policy,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.framer.is_alive()
    }

    /// Collect the next [`BATCH_SIZE`] readings from the instrument.
    ///
    /// Records are returned in arrival order. A malformed line or a
    /// transport failure aborts the whole call; there is no partial batch.
    /// In active mode a timed-out wait is handled per the configured
    /// [`TimeoutPolicy`].
    pub fn acquire_batch(&mut self) -> Result<Batch, AcquireError> {
        let mut records = Vec::with_capacity(BATCH_SIZE);

        while records.len() < BATCH_SIZE {
            let line = match self.mode {
                ReadMode::Passive => self.framer.read_message(None)?,
                ReadMode::Active => match self.framer.read_message(Some(self.read_timeout)) {
                    Ok(line) => line,
                    Err(FramerError::Timeout { waited }) => match self.timeout_policy {
                        TimeoutPolicy::Skip => {
                            log::warn!(
                                "No reading from {} within {:?}, still waiting ({}/{} collected)",
                                self.port_name,
                                waited,
                                records.len(),
                                BATCH_SIZE
                            );
                            continue;
                        }
                        TimeoutPolicy::Abort => {
                            return Err(AcquireError::Timeout { waited });
                        }
                    },
                    Err(e) => return Err(e.into()),
                },
            };

            records.push(line.parse::<Record>()?);
        }

        Ok(Batch::new(records))
    }

    /// Release the session. Consuming the handle closes the underlying
    /// transport and makes any further use a compile error, so a session
    /// cannot be released twice.
    pub fn disconnect(self) {
        log::debug!("Disconnecting from {}", self.port_name);
        drop(self.framer);
    }
}

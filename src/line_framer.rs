use serialport::SerialPort;
use std::io::{self, Read};
use std::time::{Duration, Instant};

/// Line separator the instrument uses unless reconfigured at connect time.
pub const DEFAULT_SEPARATOR: &str = "\r\n";

/// Read/liveness contract the acquisition core needs from a transport.
///
/// The library ships an implementation for `Box<dyn SerialPort>`; anything
/// else that can produce the instrument's byte stream (an in-memory replay,
/// a pipe to the signal simulator) can stand in for a real port.
pub trait GaugeTransport: Read + Send {
    /// Whether the underlying session still looks usable.
    fn is_alive(&self) -> bool;
}

impl GaugeTransport for Box<dyn SerialPort> {
    fn is_alive(&self) -> bool {
        self.bytes_to_read().is_ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FramerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No complete message within {waited:?}")]
    Timeout { waited: Duration },

    #[error("Transport closed while waiting for a message")]
    Closed,

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Splits the transport's incoming byte stream into discrete messages.
///
/// The serial port delivers bytes with no notion of message boundaries, so
/// the framer buffers whatever arrives and cuts one message per configured
/// separator, stripping the separator itself. Bytes past a separator stay
/// buffered for the next call.
#[derive(Debug)]
pub struct LineFramer<T> {
    transport: T,
    separator: Vec<u8>,
    buffer: Vec<u8>,
}

impl<T: GaugeTransport> LineFramer<T> {
    pub fn new(transport: T, separator: &str) -> Self {
        let separator = if separator.is_empty() {
            DEFAULT_SEPARATOR.as_bytes().to_vec()
        } else {
            separator.as_bytes().to_vec()
        };

        Self {
            transport,
            separator,
            buffer: Vec::new(),
        }
    }

    pub fn with_default_separator(transport: T) -> Self {
        Self::new(transport, DEFAULT_SEPARATOR)
    }

    /// Change the separator for all subsequent messages. Already-buffered
    /// bytes are kept and re-framed against the new separator.
    pub fn set_separator(&mut self, separator: &str) {
        if separator.is_empty() {
            log::warn!("Ignoring empty separator, keeping {:?}", self.separator());
            return;
        }
        self.separator = separator.as_bytes().to_vec();
    }

    pub fn separator(&self) -> String {
        String::from_utf8_lossy(&self.separator).into_owned()
    }

    pub fn is_alive(&self) -> bool {
        self.transport.is_alive()
    }

    /// Read the next complete message, stripped of its separator.
    ///
    /// With `deadline = None` the call blocks until a message arrives or the
    /// transport fails. With a deadline, waiting longer than that for a
    /// complete message returns [`FramerError::Timeout`]; any bytes of a
    /// partial message stay buffered for the next call.
    pub fn read_message(&mut self, deadline: Option<Duration>) -> Result<String, FramerError> {
        let start = Instant::now();
        let mut chunk = [0_u8; 256];

        loop {
            if let Some(end) = self.find_separator() {
                let mut message: Vec<u8> = self.buffer.drain(..end + self.separator.len()).collect();
                message.truncate(end);
                return Ok(String::from_utf8(message)?);
            }

            match self.transport.read(&mut chunk) {
                Ok(0) => return Err(FramerError::Closed),
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    // The raw port polls in short intervals; an empty
                    // interval only matters once the caller's deadline is up.
                    if let Some(limit) = deadline {
                        if start.elapsed() >= limit {
                            return Err(FramerError::Timeout { waited: limit });
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn find_separator(&self) -> Option<usize> {
        self.buffer
            .windows(self.separator.len())
            .position(|window| window == self.separator)
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ChunkReader {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ChunkReader {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
            }
        }
    }

    impl Read for ChunkReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(chunk) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                None => Ok(0),
            }
        }
    }

    impl GaugeTransport for ChunkReader {
        fn is_alive(&self) -> bool {
            !self.chunks.is_empty()
        }
    }

    struct SilentReader;

    impl Read for SilentReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(Duration::from_millis(2));
            Err(io::Error::new(io::ErrorKind::TimedOut, "no data"))
        }
    }

    impl GaugeTransport for SilentReader {
        fn is_alive(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_single_message_is_stripped_of_separator() {
        let mut framer = LineFramer::with_default_separator(ChunkReader::new(&[b"0.1\t0.2\t0.3\r\n"]));
        assert_eq!(framer.read_message(None).unwrap(), "0.1\t0.2\t0.3");
    }

    #[test]
    fn test_two_messages_in_one_chunk() {
        let mut framer =
            LineFramer::with_default_separator(ChunkReader::new(&[b"first\r\nsecond\r\n"]));
        assert_eq!(framer.read_message(None).unwrap(), "first");
        assert_eq!(framer.read_message(None).unwrap(), "second");
    }

    #[test]
    fn test_message_split_across_chunks() {
        let mut framer =
            LineFramer::with_default_separator(ChunkReader::new(&[b"0.1\t0.", b"2\t0.3\r", b"\n"]));
        assert_eq!(framer.read_message(None).unwrap(), "0.1\t0.2\t0.3");
    }

    #[test]
    fn test_custom_separator() {
        let mut framer = LineFramer::new(ChunkReader::new(&[b"a;b;"]), ";");
        assert_eq!(framer.read_message(None).unwrap(), "a");
        assert_eq!(framer.read_message(None).unwrap(), "b");
    }

    #[test]
    fn test_empty_separator_falls_back_to_default() {
        let framer = LineFramer::new(ChunkReader::new(&[]), "");
        assert_eq!(framer.separator(), DEFAULT_SEPARATOR);
    }

    #[test]
    fn test_closed_transport() {
        let mut framer = LineFramer::with_default_separator(ChunkReader::new(&[b"no newline"]));
        assert!(matches!(framer.read_message(None), Err(FramerError::Closed)));
    }

    #[test]
    fn test_deadline_expires_on_silent_transport() {
        let mut framer = LineFramer::with_default_separator(SilentReader);
        let result = framer.read_message(Some(Duration::from_millis(5)));
        assert!(matches!(result, Err(FramerError::Timeout { .. })));
    }
}

//! We use this mocking module in unit tests to emulate the socket underneath a [`ScpiClient`](crate::client::ScpiClient).

use thiserror::Error;

/// Our mock type used to emulate a byte stream to the instrument.
pub struct MockStream {
    /// Everything written by the client
    write_buffer: heapless::Vec<u8, 256>,
    /// Pre-configured bytes the instrument "sends"
    read_buffer: heapless::Vec<u8, 256>,
    /// Current position in the read buffer
    read_position: usize,
    /// Once the read buffer is drained, report end of stream instead of blocking
    end_of_stream: bool,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MockStreamError {
    /// Simulated buffer overflow
    #[error("Buffer overflow")]
    BufferOverflow,
    /// Generic simulated error for testing
    #[error("Simulated error")]
    SimulatedError,
    /// Nothing to read and the stream is still open, a real socket would time out here
    #[error("Timed out")]
    TimedOut,
}

impl embedded_io::Error for MockStreamError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockStreamError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockStreamError::SimulatedError => embedded_io::ErrorKind::Other,
            MockStreamError::TimedOut => embedded_io::ErrorKind::TimedOut,
        }
    }
}

impl embedded_io::ErrorType for MockStream {
    type Error = MockStreamError;
}

impl embedded_io::Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockStreamError::SimulatedError);
        }
        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockStreamError::BufferOverflow)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockStreamError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockStreamError::SimulatedError);
        }

        let remaining = &self.read_buffer[self.read_position..];
        if remaining.is_empty() {
            return if self.end_of_stream {
                Ok(0)
            } else {
                Err(MockStreamError::TimedOut)
            };
        }

        let count = core::cmp::min(buf.len(), remaining.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.read_position += count;
        Ok(count)
    }
}

impl MockStream {
    /// Create a new MockStream instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            end_of_stream: false,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Set the data that will be returned when read() is called
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockStreamError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockStreamError::BufferOverflow)
    }

    /// Get a reference to the data that was written to this mock stream
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Configure whether a drained stream reads as closed
    pub fn set_end_of_stream(&mut self, closed: bool) {
        self.end_of_stream = closed;
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_write_data() {
        let mut mock = MockStream::new();
        mock.write_all(b"*IDN?").unwrap();
        mock.write_all(b"\n").unwrap();
        assert_eq!(mock.written_data(), b"*IDN?\n");
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockStream::new();
        let large_data = [0u8; 300]; // Larger than 256 byte capacity
        assert_eq!(mock.write(&large_data), Err(MockStreamError::BufferOverflow));
    }

    #[test]
    fn test_read_partial_then_drained() {
        let mut mock = MockStream::new();
        mock.set_read_data(b"1.000,0.100").unwrap();

        let mut buffer = [0u8; 6];
        assert_eq!(mock.read(&mut buffer), Ok(6));
        assert_eq!(&buffer, b"1.000,");
        assert_eq!(mock.read(&mut buffer), Ok(5));
        assert_eq!(mock.read(&mut buffer), Err(MockStreamError::TimedOut));

        mock.set_end_of_stream(true);
        assert_eq!(mock.read(&mut buffer), Ok(0));
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockStream::new();
        mock.set_write_error(true);
        assert_eq!(mock.write(b"test"), Err(MockStreamError::SimulatedError));
        assert_eq!(mock.flush(), Err(MockStreamError::SimulatedError));
        assert!(mock.written_data().is_empty());

        mock.set_read_data(b"data").unwrap();
        mock.set_read_error(true);
        let mut buffer = [0u8; 4];
        assert_eq!(mock.read(&mut buffer), Err(MockStreamError::SimulatedError));
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockStreamError::TimedOut.kind(),
            embedded_io::ErrorKind::TimedOut
        ));
        assert!(matches!(
            MockStreamError::BufferOverflow.kind(),
            embedded_io::ErrorKind::OutOfMemory
        ));
    }
}

//! A minimal line framed SCPI client over any `embedded_io` byte stream.
//!
//! Commands are terminated with `\n`, responses are read up to the next `\n` (a preceding `\r` is
//! dropped). Timeouts are whatever the underlying stream does.

use embedded_io::Error as _;
use thiserror::Error;

use crate::transport::Transport;

/// Command and response terminator.
pub const TERMINATOR: u8 = b'\n';

#[derive(Error, Debug)]
pub enum ClientError<I: embedded_io::Error> {
    #[error("Stream error")]
    Io(I),
    #[error("Connection closed by instrument")]
    ConnectionClosed,
    /// Response didn't fit into the line buffer.
    #[error("Response line too long")]
    LineTooLong,
    #[error("Response is not valid UTF-8")]
    InvalidUtf8,
}

/// You can create a ScpiClient using any interface which implements [embedded_io::Read] & [embedded_io::Write].
///
/// `L` is the longest response line accepted, in bytes.
pub struct ScpiClient<S: embedded_io::Read + embedded_io::Write, const L: usize = 256> {
    interface: S,
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> ScpiClient<S, L> {
    pub fn new(interface: S) -> Self {
        Self { interface }
    }

    /// Give back the stream, e.g. to shut the socket down.
    pub fn into_inner(self) -> S {
        self.interface
    }

    fn write_line(&mut self, command: &str) -> Result<(), ClientError<S::Error>> {
        self.interface
            .write_all(command.as_bytes())
            .map_err(ClientError::Io)?;
        self.interface
            .write_all(&[TERMINATOR])
            .map_err(ClientError::Io)?;
        self.interface.flush().map_err(ClientError::Io)
    }

    fn read_line(&mut self) -> Result<String, ClientError<S::Error>> {
        let mut line: heapless::Vec<u8, L> = heapless::Vec::new();
        // One byte at a time so nothing past the terminator is consumed.
        let mut byte = [0u8; 1];
        loop {
            match self.interface.read(&mut byte) {
                Ok(0) => return Err(ClientError::ConnectionClosed),
                Ok(_) if byte[0] == TERMINATOR => break,
                Ok(_) => line.push(byte[0]).map_err(|_| ClientError::LineTooLong)?,
                Err(e) if matches!(e.kind(), embedded_io::ErrorKind::Interrupted) => continue,
                Err(e) => return Err(ClientError::Io(e)),
            }
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        core::str::from_utf8(&line)
            .map(String::from)
            .map_err(|_| ClientError::InvalidUtf8)
    }
}

impl<S: embedded_io::Read + embedded_io::Write, const L: usize> Transport for ScpiClient<S, L> {
    type Error = ClientError<S::Error>;

    fn send(&mut self, command: &str) -> Result<(), Self::Error> {
        self.write_line(command)
    }

    fn query(&mut self, command: &str) -> Result<String, Self::Error> {
        self.write_line(command)?;
        self.read_line()
    }
}

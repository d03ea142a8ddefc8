//! Our error types for the DP932A.

use thiserror::Error;

pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Custom error type for DP932A communications.
///
/// `E` is the error type of the [`Transport`](crate::transport::Transport) in use.
#[derive(Error, Debug)]
pub enum Error<E: core::fmt::Debug> {
    #[error("Transport error")]
    Transport(E),
    /// The device answered with something we can't interpret.
    #[error("Protocol violation: unexpected response {response:?} to {command:?}")]
    ProtocolViolation { command: String, response: String },
    /// Rejected before anything was sent to the device.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("Transport lock poisoned")]
    LockPoisoned,
    /// The transport can't be handed back while another handle to it is alive.
    #[error("Transport still shared")]
    TransportShared,
}

impl<E: core::fmt::Debug> Error<E> {
    pub(crate) fn protocol(command: &str, response: &str) -> Self {
        Error::ProtocolViolation {
            command: command.into(),
            response: response.into(),
        }
    }
}

//! This crate provides an interface for controlling the Rigol DP932A programmable power supply over SCPI.
//!
//! The instrument has three outputs, each with over-current and over-voltage protection, and an
//! analyzer which can capture either voltage/current/power or current pulses per channel.
//!
//! Everything goes through a single [`Transport`](transport::Transport) owned by the
//! [`Dp932a`](dp932a::Dp932a). [`ScpiClient`](client::ScpiClient) is a simple line framed
//! implementation for any `embedded_io` stream, e.g. a TCP socket to port 5555 of the instrument.
//!
//! Nothing is cached: every getter is a round trip to the device.
//!
//! Operations which must not leave the instrument in a changed state take a closure and undo their
//! changes on every exit path, panics included:
//! * [`Channel::run_active`](channel::Channel::run_active) - output enabled while the closure runs.
//! * [`Protection::run_protected`](protection::Protection::run_protected) - protection armed.
//! * [`Analyzer::run_session`](analyzer::Analyzer::run_session) - analyzer running.
//! * [`Dp932a::attention_sequence`](dp932a::Dp932a::attention_sequence) - display blinking.
//!
//! With a `Send` transport a `Dp932a` can be shared between threads, each command/response pair is
//! serialized.

pub mod analyzer;
pub mod channel;
pub mod client;
pub mod dp932a;
pub mod error;
pub mod protection;
mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mock_stream;
#[cfg(test)]
mod mock_transport;

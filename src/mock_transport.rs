//! We use this mocking module in unit tests to stand in for a DP932A on the other end of the link.

use std::collections::VecDeque;

use crate::transport::Transport;

/// Our mock type used to emulate the instrument at the command level.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Every command received, sends and queries alike, in order.
    commands: Vec<String>,
    /// Pre-configured responses, handed out to queries in order
    responses: VecDeque<String>,
    /// Commands which should fail with [`MockTransportError::Injected`]
    failing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockTransportError {
    /// A query arrived but no response was scripted for it
    Unscripted(String),
    /// Simulated failure for a command registered with `fail_on`
    Injected(String),
}

impl Transport for MockTransport {
    type Error = MockTransportError;

    fn send(&mut self, command: &str) -> Result<(), Self::Error> {
        self.commands.push(command.into());
        self.check_failure(command)
    }

    fn query(&mut self, command: &str) -> Result<String, Self::Error> {
        self.commands.push(command.into());
        self.check_failure(command)?;
        self.responses
            .pop_front()
            .ok_or_else(|| MockTransportError::Unscripted(command.into()))
    }
}

impl MockTransport {
    /// Create a new MockTransport with no scripted responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MockTransport which answers queries with `responses`, in order
    pub fn with_responses<I, R>(responses: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let mut mock = Self::new();
        mock.push_responses(responses);
        mock
    }

    /// Queue up further responses
    pub fn push_responses<I, R>(&mut self, responses: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.responses.extend(responses.into_iter().map(Into::into));
    }

    /// Make any future occurrence of `command` fail
    pub fn fail_on(&mut self, command: &str) {
        self.failing.push(command.into());
    }

    /// All commands received so far
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// The most recent command received
    pub fn last_command(&self) -> Option<&str> {
        self.commands.last().map(String::as_str)
    }

    /// Responses which were never consumed
    pub fn remaining_responses(&self) -> usize {
        self.responses.len()
    }

    fn check_failure(&self, command: &str) -> Result<(), MockTransportError> {
        if self.failing.iter().any(|c| c == command) {
            Err(MockTransportError::Injected(command.into()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_sends_and_queries() {
        let mut mock = MockTransport::with_responses(["1"]);
        mock.send(":OUTP CH1,ON").unwrap();
        assert_eq!(mock.query(":OUTP? CH1").unwrap(), "1");
        assert_eq!(mock.commands(), [":OUTP CH1,ON", ":OUTP? CH1"]);
        assert_eq!(mock.last_command(), Some(":OUTP? CH1"));
        assert_eq!(mock.remaining_responses(), 0);
    }

    #[test]
    fn test_unscripted_query() {
        let mut mock = MockTransport::new();
        assert_eq!(
            mock.query("*IDN?"),
            Err(MockTransportError::Unscripted("*IDN?".into()))
        );
    }

    #[test]
    fn test_injected_failure_does_not_consume_response() {
        let mut mock = MockTransport::with_responses(["0"]);
        mock.fail_on("*TST?");
        assert!(matches!(
            mock.query("*TST?"),
            Err(MockTransportError::Injected(_))
        ));
        assert_eq!(mock.remaining_responses(), 1);
    }
}

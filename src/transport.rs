//! The command/response collaborator and the shared handle every sub-object talks through.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Error, Result};
use crate::types::State;

/// A line oriented SCPI transport.
///
/// Framing, error-queue draining and connection lifecycle all live behind this trait. See
/// [`ScpiClient`](crate::client::ScpiClient) for an implementation over any `embedded_io` stream.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Send a command which produces no response.
    fn send(&mut self, command: &str) -> core::result::Result<(), Self::Error>;

    /// Send a command and return the single response line.
    fn query(&mut self, command: &str) -> core::result::Result<String, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    type Error = T::Error;

    fn send(&mut self, command: &str) -> core::result::Result<(), Self::Error> {
        (**self).send(command)
    }

    fn query(&mut self, command: &str) -> core::result::Result<String, Self::Error> {
        (**self).query(command)
    }
}

/// Handle to the transport shared by the instrument, its channels and the analyzer.
///
/// The lock is held for exactly one command/response pair.
pub(crate) struct Link<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> Link<T> {
    pub(crate) fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, T>, T::Error> {
        self.inner.lock().map_err(|_| Error::LockPoisoned)
    }

    pub(crate) fn send(&self, command: &str) -> Result<(), T::Error> {
        log::trace!("-> {command}");
        self.lock()?.send(command).map_err(Error::Transport)
    }

    /// Query and return the response with surrounding whitespace removed.
    pub(crate) fn query(&self, command: &str) -> Result<String, T::Error> {
        log::trace!("-> {command}");
        let response = self.lock()?.query(command).map_err(Error::Transport)?;
        log::trace!("<- {response}");
        Ok(response.trim().into())
    }

    pub(crate) fn query_bool(&self, command: &str) -> Result<bool, T::Error> {
        let response = self.query(command)?;
        State::from_str(&response)
            .map(bool::from)
            .map_err(|_| Error::protocol(command, &response))
    }

    /// Query a value parsed with [`FromStr`], any parse failure being a protocol violation.
    pub(crate) fn query_parse<V: FromStr>(&self, command: &str) -> Result<V, T::Error> {
        let response = self.query(command)?;
        response
            .parse()
            .map_err(|_| Error::protocol(command, &response))
    }

    /// Take the transport back. Fails if another handle is still alive.
    pub(crate) fn into_inner(self) -> core::result::Result<T, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(Self { inner }),
        }
    }

    #[cfg(test)]
    pub(crate) fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

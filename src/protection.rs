//! Over-current and over-voltage protection of a single channel.

use strum_macros::Display;

use crate::{
    error::Result,
    session::scoped,
    transport::{Link, Transport},
    types::{ChannelId, ProtectionState, State},
};

/// The quantity a [`Protection`] guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ProtectedQuantity {
    #[strum(serialize = "CURRent")]
    Current,
    #[strum(serialize = "VOLTage")]
    Voltage,
}

/// One protection threshold family (OCP or OVP) of one channel.
///
/// Nothing is cached, every getter goes to the device.
pub struct Protection<T: Transport> {
    link: Link<T>,
    /// Command prefix, e.g. `:SOURce[1]:CURRent:PROT`.
    prefix: String,
    channel: ChannelId,
    quantity: ProtectedQuantity,
}

impl<T: Transport> Protection<T> {
    pub(crate) fn new(link: Link<T>, channel: ChannelId, quantity: ProtectedQuantity) -> Self {
        let prefix = format!(":SOURce[{}]:{}:PROT", channel.number(), quantity);
        Self {
            link,
            prefix,
            channel,
            quantity,
        }
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn quantity(&self) -> ProtectedQuantity {
        self.quantity
    }

    /// Whether the protection is armed.
    pub fn get_state(&self) -> Result<bool, T::Error> {
        self.link.query_bool(&format!("{}:STAT?", self.prefix))
    }

    /// Arm or disarm the protection.
    ///
    /// Call [`Self::clear`] before arming, otherwise a stale trip may be reported straight away.
    pub fn set_state(&self, state: impl Into<State>) -> Result<(), T::Error> {
        self.link
            .send(&format!("{}:STAT {}", self.prefix, state.into()))
    }

    /// Trip threshold in volts or amps.
    pub fn get_level(&self) -> Result<f64, T::Error> {
        self.link.query_parse(&format!("{}?", self.prefix))
    }

    pub fn set_level(&self, level: f64) -> Result<(), T::Error> {
        self.link.send(&format!("{} {:.3}", self.prefix, level))
    }

    /// Whether the threshold was exceeded since the last [`Self::clear`].
    pub fn is_tripped(&self) -> Result<bool, T::Error> {
        self.link.query_bool(&format!("{}:TRIP?", self.prefix))
    }

    /// Reset the trip latch. Arm state and threshold are left alone.
    pub fn clear(&self) -> Result<(), T::Error> {
        self.link.send(&format!("{}:CLE", self.prefix))
    }

    /// Read arm state, threshold and trip latch in one go.
    pub fn get_protection_state(&self) -> Result<ProtectionState, T::Error> {
        Ok(ProtectionState {
            armed: self.get_state()?,
            threshold: self.get_level()?,
            tripped: self.is_tripped()?,
        })
    }

    /// Clear, set the threshold to `level` and arm, then run `body`.
    ///
    /// The protection is disarmed again however `body` ends, including by error or panic.
    pub fn run_protected<R>(
        &self,
        level: f64,
        body: impl FnOnce(&Self) -> Result<R, T::Error>,
    ) -> Result<R, T::Error> {
        log::debug!("{} {} protection armed at {:.3}", self.channel, self.quantity, level);
        scoped(
            || {
                self.clear()?;
                self.set_level(level)?;
                self.set_state(true)?;
                body(self)
            },
            || {
                self.set_state(false)?;
                log::debug!("{} {} protection disarmed", self.channel, self.quantity);
                Ok(())
            },
        )
    }
}

use std::time::Duration;

use fugit::MillisDurationU32;
use strum::IntoEnumIterator;

use crate::{
    analyzer::Analyzer,
    channel::Channel,
    error::{Error, Result},
    session::scoped,
    transport::{Link, Transport},
    types::{ChannelId, State},
};

/// Combined error queue, identification and self-test query sent once on construction.
const HANDSHAKE: &str = ":SYSTem:ERRor?;*IDN?;*TST?";
const NO_ERROR: &str = "0,\"No error\"";
const SELF_TEST_PASSED: &str = "0";
const MAX_BRIGHTNESS: u8 = 100;

/// Parameters of [`Dp932a::attention_sequence_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttentionConfig {
    /// Display brightness in percent during the bright half of a blink.
    pub high_brightness: u8,
    /// Display brightness in percent during the dark half of a blink.
    pub low_brightness: u8,
    /// Time spent at each brightness.
    pub half_period: MillisDurationU32,
    /// Each cycle is two blinks with a beep between them.
    pub cycles: u8,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            high_brightness: 100,
            low_brightness: 10,
            half_period: MillisDurationU32::millis(500),
            cycles: 3,
        }
    }
}

/// You can create a Dp932a using any [`Transport`], e.g. a [`ScpiClient`](crate::client::ScpiClient)
/// wrapping a TCP socket to port 5555 of the instrument.
///
/// The instrument owns the transport. Its three channels and the analyzer all talk through it, so
/// traffic to the device is always serialized.
pub struct Dp932a<T: Transport> {
    link: Link<T>,
    channels: [Channel<T>; 3],
    analyzer: Analyzer<T>,
    identification: Option<String>,
}

impl<T: Transport> Dp932a<T> {
    /// Take ownership of `transport` and run the startup handshake.
    ///
    /// A dirty error queue, a failed self-test or even a failed handshake only get logged. The
    /// instrument may well be usable regardless.
    pub fn new(transport: T) -> Self {
        let link = Link::new(transport);
        let identification = handshake(&link);
        Self {
            channels: [ChannelId::Ch1, ChannelId::Ch2, ChannelId::Ch3]
                .map(|id| Channel::new(id, link.clone())),
            analyzer: Analyzer::new(link.clone()),
            link,
            identification,
        }
    }

    /// `*IDN?` response captured during the handshake, if there was one.
    pub fn identification(&self) -> Option<&str> {
        self.identification.as_deref()
    }

    pub fn channel(&self, id: ChannelId) -> &Channel<T> {
        &self.channels[usize::from(id.number() - 1)]
    }

    pub fn ch1(&self) -> &Channel<T> {
        self.channel(ChannelId::Ch1)
    }

    pub fn ch2(&self) -> &Channel<T> {
        self.channel(ChannelId::Ch2)
    }

    pub fn ch3(&self) -> &Channel<T> {
        self.channel(ChannelId::Ch3)
    }

    /// All three channels in order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel<T>> {
        ChannelId::iter().map(|id| self.channel(id))
    }

    pub fn analyzer(&self) -> &Analyzer<T> {
        &self.analyzer
    }

    /// Send a raw command.
    pub fn send(&self, command: &str) -> Result<(), T::Error> {
        self.link.send(command)
    }

    /// Send a raw query and return the trimmed response.
    pub fn query(&self, command: &str) -> Result<String, T::Error> {
        self.link.query(command)
    }

    /// Run the self-test again.
    pub fn passed_self_test(&self) -> Result<bool, T::Error> {
        Ok(self.link.query("*TST?")? == SELF_TEST_PASSED)
    }

    /// Display brightness in percent.
    pub fn get_display_brightness(&self) -> Result<u8, T::Error> {
        const COMMAND: &str = ":SYST:BRIG?";
        let response = self.link.query(COMMAND)?;
        match response.parse::<u8>() {
            Ok(percent) if percent <= MAX_BRIGHTNESS => Ok(percent),
            _ => Err(Error::protocol(COMMAND, &response)),
        }
    }

    pub fn set_display_brightness(&self, percent: u8) -> Result<(), T::Error> {
        if percent > MAX_BRIGHTNESS {
            return Err(Error::InvalidArgument("brightness is a percentage"));
        }
        self.link.send(&format!(":SYST:BRIG {percent}"))
    }

    /// Whether key presses beep.
    pub fn get_beeper(&self) -> Result<bool, T::Error> {
        self.link.query_bool(":SYST:BEEP?")
    }

    pub fn set_beeper(&self, state: impl Into<State>) -> Result<(), T::Error> {
        self.link.send(&format!(":SYST:BEEP {}", state.into()))
    }

    /// Beep once, right now.
    pub fn beep(&self) -> Result<(), T::Error> {
        self.link.send(":SYSTem:BEEPer:IMMediate")
    }

    /// Blink the display and beep so someone in the lab finds the right instrument.
    ///
    /// Takes about three seconds. Brightness and beeper are restored however this ends.
    pub fn attention_sequence(&self) -> Result<(), T::Error> {
        self.attention_sequence_with(&AttentionConfig::default())
    }

    pub fn attention_sequence_with(&self, config: &AttentionConfig) -> Result<(), T::Error> {
        let brightness = self.get_display_brightness()?;
        let beeper = self.get_beeper()?;
        let half_period = Duration::from_millis(config.half_period.to_millis().into());

        let blink = || -> Result<(), T::Error> {
            self.set_display_brightness(config.high_brightness)?;
            std::thread::sleep(half_period);
            self.set_display_brightness(config.low_brightness)?;
            std::thread::sleep(half_period);
            Ok(())
        };

        scoped(
            || {
                for _ in 0..config.cycles {
                    blink()?;
                    self.beep()?;
                    blink()?;
                }
                Ok(())
            },
            || {
                let brightness = self.set_display_brightness(brightness);
                let beeper = self.set_beeper(beeper);
                brightness.and(beeper)
            },
        )
    }

    /// Drop the channels and analyzer and hand the transport back to the caller, e.g. to close it.
    pub fn into_transport(self) -> Result<T, T::Error> {
        let Self {
            link,
            channels,
            analyzer,
            ..
        } = self;
        drop(channels);
        drop(analyzer);
        link.into_inner().map_err(|_| {
            log::error!("transport handle outlived its instrument");
            Error::TransportShared
        })
    }
}

/// Returns the identification string if the handshake got that far.
fn handshake<T: Transport>(link: &Link<T>) -> Option<String> {
    let response = match link.query(HANDSHAKE) {
        Ok(response) => response,
        Err(err) => {
            log::error!("failed querying identification of device: {err:?}");
            return None;
        }
    };

    let parts: Vec<&str> = response.split(';').map(str::trim).collect();
    let [error, idn, self_test] = parts[..] else {
        log::error!("unexpected handshake response: {response:?}");
        return None;
    };

    if error != NO_ERROR {
        log::error!("device has remaining errors in queue: {error:?}");
    }
    if self_test != SELF_TEST_PASSED {
        log::error!("device didn't pass self test: {self_test:?}");
    }
    log::debug!("connected to {idn:?}");
    Some(idn.into())
}

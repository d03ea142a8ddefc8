//! This module contains the value types exchanged with the DP932A.

use core::fmt;

use strum_macros::{Display, EnumIter, EnumString};

/// Used to be less ambiguous and whether something is on or off.
///
/// Written as `ON`/`OFF` (or `1`/`0` via `as u16`), read back from either form.
#[repr(u16)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum State {
    /// Disabled.
    #[default]
    #[strum(to_string = "OFF", serialize = "0")]
    Off = 0x00,
    /// Enabled.
    #[strum(to_string = "ON", serialize = "1")]
    On = 0x01,
}

impl From<State> for bool {
    fn from(value: State) -> Self {
        match value {
            State::Off => false,
            State::On => true,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        match value {
            true => State::On,
            false => State::Off,
        }
    }
}

/// The three outputs of the DP932A. Formats as the `CH<i>` tag used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ChannelId {
    #[strum(serialize = "CH1")]
    Ch1 = 1,
    #[strum(serialize = "CH2")]
    Ch2 = 2,
    #[strum(serialize = "CH3")]
    Ch3 = 3,
}

impl ChannelId {
    /// 1-based channel number.
    pub const fn number(self) -> u8 {
        self as u8
    }
}

/// Commanded voltage and current set-points of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Output {
    /// Volts.
    pub voltage: f64,
    /// Amps.
    pub current: f64,
}

impl Output {
    pub const fn new(voltage: f64, current: f64) -> Self {
        Self { voltage, current }
    }
}

/// A live reading from [`Channel::probe`](crate::channel::Channel::probe).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
}

/// Snapshot of one protection. `tripped` is latched by the device until cleared.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProtectionState {
    pub armed: bool,
    pub threshold: f64,
    pub tripped: bool,
}

/// Regulation mode reported by a channel.
///
/// There is no way of commanding this. The output sits in CV most of the time and only drops into
/// CC once it hits its current limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum OutputMode {
    #[strum(serialize = "CV")]
    ConstantVoltage,
    #[strum(serialize = "CC")]
    ConstantCurrent,
    #[strum(serialize = "UR")]
    Unregulated,
}

/// Which of the two mutually exclusive analyzer modes is in charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum AnalysisType {
    #[strum(to_string = "COM", serialize = "COMMon")]
    Common,
    #[strum(to_string = "CURR", serialize = "CURRent")]
    PulseCurrent,
}

/// Quantity captured for one channel in common analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum CommonAnalysisType {
    #[strum(serialize = "V")]
    Voltage,
    #[strum(serialize = "C")]
    Current,
    #[strum(serialize = "P")]
    Power,
}

/// Common analysis selection. Channels left as `None` are not analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommonAnalysis {
    pub ch1: Option<CommonAnalysisType>,
    pub ch2: Option<CommonAnalysisType>,
    pub ch3: Option<CommonAnalysisType>,
}

impl CommonAnalysis {
    pub fn get(&self, channel: ChannelId) -> Option<CommonAnalysisType> {
        match channel {
            ChannelId::Ch1 => self.ch1,
            ChannelId::Ch2 => self.ch2,
            ChannelId::Ch3 => self.ch3,
        }
    }

    pub fn set(&mut self, channel: ChannelId, analysis: Option<CommonAnalysisType>) {
        match channel {
            ChannelId::Ch1 => self.ch1 = analysis,
            ChannelId::Ch2 => self.ch2 = analysis,
            ChannelId::Ch3 => self.ch3 = analysis,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ch1.is_none() && self.ch2.is_none() && self.ch3.is_none()
    }

    /// `CH<i>_<TYPE>` tags of every configured channel, in channel order.
    pub(crate) fn tags(&self) -> Vec<String> {
        [ChannelId::Ch1, ChannelId::Ch2, ChannelId::Ch3]
            .into_iter()
            .filter_map(|ch| self.get(ch).map(|analysis| format!("{ch}_{analysis}")))
            .collect()
    }
}

/// Pulse-current analysis selection. Only CH1 and CH2 support it, and the device insists on at
/// least one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseCurrentAnalysis {
    pub ch1: bool,
    pub ch2: bool,
}

impl Default for PulseCurrentAnalysis {
    fn default() -> Self {
        Self {
            ch1: true,
            ch2: true,
        }
    }
}

impl PulseCurrentAnalysis {
    pub(crate) fn tags(&self) -> Vec<&'static str> {
        let mut tags = Vec::with_capacity(2);
        if self.ch1 {
            tags.push("CH1");
        }
        if self.ch2 {
            tags.push("CH2");
        }
        tags
    }
}

/// Either analyzer configuration, used to start an analyzer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisConfig {
    Common(CommonAnalysis),
    PulseCurrent(PulseCurrentAnalysis),
}

impl From<CommonAnalysis> for AnalysisConfig {
    fn from(value: CommonAnalysis) -> Self {
        AnalysisConfig::Common(value)
    }
}

impl From<PulseCurrentAnalysis> for AnalysisConfig {
    fn from(value: PulseCurrentAnalysis) -> Self {
        AnalysisConfig::PulseCurrent(value)
    }
}

/// Diagnostic snapshot of a channel. Not meant to be parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSummary {
    pub channel: ChannelId,
    pub measured: Measurement,
    pub set: Output,
}

impl fmt::Display for ChannelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}: voltage: {:.3} V (set: {:.3} V), current: {:.3} A (set: {:.3} A)>",
            self.channel,
            self.measured.voltage,
            self.set.voltage,
            self.measured.current,
            self.set.current
        )
    }
}

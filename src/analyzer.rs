//! The device-wide analyzer: measurement capture and logging, in one of two exclusive modes.
//!
//! Switching [`AnalysisType`] while a run is active is not prevented here, but the device isn't
//! guaranteed to behave sensibly. Stop the run first.

use core::str::FromStr;

use crate::{
    error::{Error, Result},
    session::scoped,
    transport::{Link, Transport},
    types::{
        AnalysisConfig, AnalysisType, ChannelId, CommonAnalysis, CommonAnalysisType,
        PulseCurrentAnalysis, State,
    },
};

const STATE: &str = ":ANALyzer:STATe";
const SAVE_STATE: &str = ":ANALyzer:SAVE:STATe";
const SAVE_ROUTE: &str = ":ANALyzer:SAVE:ROUTe";
const TYPE: &str = ":ANALyzer:TYPE";
const COMMON_MEASURE: &str = ":ANALyzer:COMMon:MEASure:TYPE";
const CURRENT_MEASURE: &str = ":ANALyzer:CURRent:MEASure:TYPE";

pub struct Analyzer<T: Transport> {
    link: Link<T>,
}

impl<T: Transport> Analyzer<T> {
    pub(crate) fn new(link: Link<T>) -> Self {
        Self { link }
    }

    /// Whether the analyzer is running.
    pub fn get_active(&self) -> Result<bool, T::Error> {
        self.link.query_bool(&format!("{STATE}?"))
    }

    /// Start or stop the analyzer.
    pub fn set_active(&self, state: impl Into<State>) -> Result<(), T::Error> {
        let state: State = state.into();
        self.link.send(&format!("{STATE} {}", state as u16))
    }

    /// Whether the analyzer output is being saved to a file.
    pub fn get_logging(&self) -> Result<bool, T::Error> {
        self.link.query_bool(&format!("{SAVE_STATE}?"))
    }

    pub fn set_logging(&self, state: impl Into<State>) -> Result<(), T::Error> {
        let state: State = state.into();
        self.link.send(&format!("{SAVE_STATE} {}", state as u16))
    }

    /// Path the log file is saved to, as reported by the device.
    pub fn get_log_path(&self) -> Result<String, T::Error> {
        self.link.query(&format!("{SAVE_ROUTE}?"))
    }

    /// Control characters are rejected, a line break would end the command early.
    pub fn set_log_path(&self, path: &str) -> Result<(), T::Error> {
        if path.chars().any(char::is_control) {
            return Err(Error::InvalidArgument(
                "log path must not contain control characters",
            ));
        }
        self.link.send(&format!("{SAVE_ROUTE} {path}"))
    }

    pub fn get_type(&self) -> Result<AnalysisType, T::Error> {
        self.link.query_parse(&format!("{TYPE}?"))
    }

    /// Select which configuration family is in charge. The other family's configuration stays
    /// stored on the device.
    pub fn set_type(&self, analysis_type: AnalysisType) -> Result<(), T::Error> {
        self.link.send(&format!("{TYPE} {analysis_type}"))
    }

    /// Read back the common analysis selection, e.g. `CH1_V CH2_C CH3_P`.
    pub fn get_common_measure(&self) -> Result<CommonAnalysis, T::Error> {
        let command = format!("{COMMON_MEASURE}?");
        let response = self.link.query(&command)?;
        parse_common(&response).ok_or_else(|| Error::protocol(&command, &response))
    }

    /// Switch to common analysis with the given channels.
    ///
    /// An empty selection is rejected before anything is sent.
    pub fn set_common_measure(&self, config: CommonAnalysis) -> Result<(), T::Error> {
        if config.is_empty() {
            return Err(Error::InvalidArgument(
                "common analysis requires at least one configured channel",
            ));
        }
        self.set_type(AnalysisType::Common)?;
        self.link
            .send(&format!("{COMMON_MEASURE} {}", config.tags().join(",")))
    }

    /// Read back which channels pulse-current analysis covers.
    pub fn get_pulse_current_measure(&self) -> Result<PulseCurrentAnalysis, T::Error> {
        let command = format!("{CURRENT_MEASURE}?");
        let response = self.link.query(&command)?;
        parse_pulse_current(&response).ok_or_else(|| Error::protocol(&command, &response))
    }

    /// Switch to pulse-current analysis on the enabled channels.
    ///
    /// The device needs at least one of them, otherwise nothing is sent.
    pub fn set_pulse_current_measure(&self, config: PulseCurrentAnalysis) -> Result<(), T::Error> {
        if !(config.ch1 || config.ch2) {
            return Err(Error::InvalidArgument(
                "pulse-current analysis requires at least one enabled channel",
            ));
        }
        self.set_type(AnalysisType::PulseCurrent)?;
        self.link
            .send(&format!("{CURRENT_MEASURE} {}", config.tags().join(",")))
    }

    /// Apply either configuration.
    pub fn configure(&self, config: impl Into<AnalysisConfig>) -> Result<(), T::Error> {
        match config.into() {
            AnalysisConfig::Common(config) => self.set_common_measure(config),
            AnalysisConfig::PulseCurrent(config) => self.set_pulse_current_measure(config),
        }
    }

    /// Configure, optionally start logging, start the analyzer and run `body`.
    ///
    /// Afterwards the run state is always put back to what it was before. The logging state is
    /// put back only when `log` is set, i.e. when this session touched it.
    pub fn run_session<R>(
        &self,
        config: impl Into<AnalysisConfig>,
        log: bool,
        body: impl FnOnce(&Self) -> Result<R, T::Error>,
    ) -> Result<R, T::Error> {
        let config = config.into();
        let was_logging = self.get_logging()?;
        let was_active = self.get_active()?;
        log::debug!("analyzer session {config:?}, logging: {log}");

        let result = scoped(
            || {
                self.configure(config)?;
                if log {
                    self.set_logging(true)?;
                }
                self.set_active(true)?;
                body(self)
            },
            || {
                let active = self.set_active(was_active);
                let logging = if log {
                    self.set_logging(was_logging)
                } else {
                    Ok(())
                };
                active.and(logging)
            },
        );
        log::debug!("analyzer session finished");
        result
    }
}

/// At least one `CH<i>_<TYPE>` token, each channel at most once.
fn parse_common(response: &str) -> Option<CommonAnalysis> {
    let mut config = CommonAnalysis::default();
    for token in response.split([' ', ',']).filter(|t| !t.is_empty()) {
        let (channel, analysis) = token.split_once('_')?;
        let channel = ChannelId::from_str(channel).ok()?;
        let analysis = CommonAnalysisType::from_str(analysis).ok()?;
        if config.get(channel).is_some() {
            return None;
        }
        config.set(channel, Some(analysis));
    }
    (!config.is_empty()).then_some(config)
}

fn parse_pulse_current(response: &str) -> Option<PulseCurrentAnalysis> {
    let mut config = PulseCurrentAnalysis {
        ch1: false,
        ch2: false,
    };
    for token in response.split([' ', ',']).filter(|t| !t.is_empty()) {
        match ChannelId::from_str(token).ok()? {
            ChannelId::Ch1 => config.ch1 = true,
            ChannelId::Ch2 => config.ch2 = true,
            ChannelId::Ch3 => return None,
        }
    }
    Some(config)
}

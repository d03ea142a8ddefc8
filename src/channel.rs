//! One output channel of the DP932A.

use crate::{
    error::{Error, Result},
    protection::{ProtectedQuantity, Protection},
    session::scoped,
    transport::{Link, Transport},
    types::{ChannelId, ChannelSummary, Measurement, Output, OutputMode, State},
};

/// A single output channel together with its over-current and over-voltage protection.
///
/// For it's methods, "get"/"set" read and write configuration, whereas [`Self::probe`] measures.
pub struct Channel<T: Transport> {
    id: ChannelId,
    link: Link<T>,
    ocp: Protection<T>,
    ovp: Protection<T>,
}

impl<T: Transport> Channel<T> {
    pub(crate) fn new(id: ChannelId, link: Link<T>) -> Self {
        Self {
            id,
            ocp: Protection::new(link.clone(), id, ProtectedQuantity::Current),
            ovp: Protection::new(link.clone(), id, ProtectedQuantity::Voltage),
            link,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Over-current protection.
    pub fn ocp(&self) -> &Protection<T> {
        &self.ocp
    }

    /// Over-voltage protection.
    pub fn ovp(&self) -> &Protection<T> {
        &self.ovp
    }

    /// Read back the voltage and current set-points.
    pub fn get_output(&self) -> Result<Output, T::Error> {
        let command = format!(":APPL? {}", self.id);
        let response = self.link.query(&command)?;
        parse_output(&response).ok_or_else(|| Error::protocol(&command, &response))
    }

    /// Write both set-points, rounded to 3 decimals.
    pub fn set_output(&self, output: Output) -> Result<(), T::Error> {
        self.link.send(&format!(
            ":APPL {},{:.3},{:.3}",
            self.id, output.voltage, output.current
        ))
    }

    /// Take a fresh voltage, current and power measurement.
    pub fn probe(&self) -> Result<Measurement, T::Error> {
        let command = format!("MEAS:ALL? {}", self.id);
        let response = self.link.query(&command)?;
        parse_measurement(&response).ok_or_else(|| Error::protocol(&command, &response))
    }

    pub fn get_enabled(&self) -> Result<bool, T::Error> {
        self.link.query_bool(&format!(":OUTP? {}", self.id))
    }

    pub fn set_enabled(&self, state: impl Into<State>) -> Result<(), T::Error> {
        self.link
            .send(&format!(":OUTP {},{}", self.id, state.into()))
    }

    pub fn enable(&self) -> Result<(), T::Error> {
        self.set_enabled(State::On)
    }

    pub fn disable(&self) -> Result<(), T::Error> {
        self.set_enabled(State::Off)
    }

    /// Regulation mode the channel is currently in. Determined by the load, so there is no setter.
    pub fn get_output_mode(&self) -> Result<OutputMode, T::Error> {
        self.link.query_parse(&format!(":OUTP:MODE? {}", self.id))
    }

    /// Apply `output`, enable the channel and run `body`.
    ///
    /// The channel is disabled again however `body` ends, including by error or panic.
    pub fn run_active<R>(
        &self,
        output: Output,
        body: impl FnOnce(&Self) -> Result<R, T::Error>,
    ) -> Result<R, T::Error> {
        log::debug!(
            "{} active at {:.3} V / {:.3} A",
            self.id,
            output.voltage,
            output.current
        );
        scoped(
            || {
                self.set_output(output)?;
                self.enable()?;
                body(self)
            },
            || {
                self.disable()?;
                log::debug!("{} disabled", self.id);
                Ok(())
            },
        )
    }

    /// Measurement and set-point side by side, for diagnostics.
    pub fn summary(&self) -> Result<ChannelSummary, T::Error> {
        let set = self.get_output()?;
        let measured = self.probe()?;
        Ok(ChannelSummary {
            channel: self.id,
            measured,
            set,
        })
    }
}

/// `<name>:<rating>,<V>,<I>`, e.g. `CH1:30V/3A,5.000,1.000`.
fn parse_output(response: &str) -> Option<Output> {
    let (_name, fields) = response.split_once(':')?;
    let mut fields = fields.split(',');
    let _rating = fields.next()?;
    let voltage = fields.next()?.trim().parse().ok()?;
    let current = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Output { voltage, current })
}

/// `<V>,<I>,<P>`.
fn parse_measurement(response: &str) -> Option<Measurement> {
    let mut fields = response.split(',').map(|f| f.trim().parse::<f64>());
    let voltage = fields.next()?.ok()?;
    let current = fields.next()?.ok()?;
    let power = fields.next()?.ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Measurement {
        voltage,
        current,
        power,
    })
}

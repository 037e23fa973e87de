//! The blocking (non-async) thermocouple driver.
//!
//! Intended for firmware that polls its sensors from a single control loop.

use core::str::FromStr;

use crate::{
    convert, resolve_pin, BindError, Calibration, ConfigSource, DiagnosticSink, Extrema, Reading,
    TemperatureSensor,
};

/// The ADC subsystem capability consumed by this driver.
///
/// The subsystem owns the hardware and arbitrates it across every registered
/// sensor; it also performs any sample filtering. A pin must be enabled
/// before it is read.
pub trait Adc {
    /// Identifier for an ADC-capable input.
    type Pin;

    /// Registers `pin` so subsequent reads are serviced.
    fn enable_pin(&mut self, pin: &Self::Pin);
    /// Returns one filtered sample for `pin`, in `[0, max_value]`.
    fn read(&mut self, pin: &Self::Pin) -> u32;
    /// The maximum representable sample value.
    fn max_value(&self) -> u32;
}

/// A thermocouple amplifier read through a raw ADC pin, with linear
/// calibration and rolling min/max tracking.
pub struct ThermocoupleSensor<A: Adc> {
    adc: A,
    pin: A::Pin,
    calibration: Calibration,
    extrema: Extrema,
}

impl<A: Adc> ThermocoupleSensor<A> {
    /// Resolves this sensor's configuration under `(module, instance)`,
    /// registers the pin with the ADC and returns the bound driver.
    ///
    /// The `pin` key is required and must parse as `A::Pin`; `offset`,
    /// `gain` and `mv_per_c` default to 0, 1 and 10. Errors here are fatal
    /// configuration errors and should abort startup.
    pub fn bind<C: ConfigSource>(
        mut adc: A,
        config: &C,
        module: &str,
        instance: &str,
    ) -> Result<Self, BindError>
    where
        A::Pin: FromStr,
    {
        let pin = resolve_pin(config, module, instance)?;
        let calibration = Calibration::from_config(config, module, instance)?;

        adc.enable_pin(&pin);

        Ok(Self {
            adc,
            pin,
            calibration,
            extrema: Extrema::new(),
        })
    }

    /// Takes one filtered sample and returns it with its converted
    /// temperature, widening the rolling extrema.
    pub fn read(&mut self) -> Reading {
        let sample = self.adc.read(&self.pin);
        let celsius = convert::sample_to_celsius(sample, self.adc.max_value(), &self.calibration);
        self.extrema.record(celsius);

        Reading { sample, celsius }
    }

    /// Takes one reading and returns degrees Celsius.
    ///
    /// Never fails: an open-circuit sensor reads as positive infinity, which
    /// upstream thermal protection treats as a fault.
    pub fn read_temperature(&mut self) -> f32 {
        self.read().celsius
    }

    /// Writes the raw/converted/calibration state as one line to `sink` and
    /// resets the rolling extrema to the temperature just computed.
    ///
    /// This is the only reset path for the extrema.
    pub fn emit_diagnostic<D: DiagnosticSink>(&mut self, sink: &mut D) {
        let sample = self.adc.read(&self.pin);
        let max_sample = self.adc.max_value();
        let celsius = convert::sample_to_celsius(sample, max_sample, &self.calibration);

        sink.write_line(format_args!(
            "adc = {}, max_adc = {}, temp = {}, offset = {}, gain = {}, mv per c = {}",
            sample,
            max_sample,
            celsius,
            self.calibration.offset,
            self.calibration.gain,
            self.calibration.mv_per_c,
        ));

        self.extrema.reset_to(celsius);
    }

    /// Lowest temperature computed since binding or the last diagnostic.
    pub fn min_temp(&self) -> f32 {
        self.extrema.min
    }

    /// Highest temperature computed since binding or the last diagnostic.
    pub fn max_temp(&self) -> f32 {
        self.extrema.max
    }

    /// The calibration constants in effect.
    pub fn calibration(&self) -> Calibration {
        self.calibration
    }
}

impl<A: Adc> TemperatureSensor for ThermocoupleSensor<A> {
    fn read_temperature(&mut self) -> f32 {
        ThermocoupleSensor::read_temperature(self)
    }
}

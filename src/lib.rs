//! # adc-thermocouple
//!
//! Temperature reader for thermocouples wired through an external amplifier
//! into a raw ADC pin, as used by heater and thermal-protection logic in
//! motion-control firmware.
//!
//! ## Features
//! * Linear voltage→temperature transform with per-sensor `offset`, `gain`
//!   and `mv_per_c` calibration constants
//! * Configuration-driven binding (required `pin`, defaulted constants)
//! * Rolling min/max tracking of every computed temperature
//! * Open-circuit detection: a sample pinned at the ADC ceiling reads as
//!   positive infinity, the in-band fault value upstream safety logic expects
//! * Diagnostic dump of the raw/converted/calibration state that resets the
//!   rolling extrema
//! * Blocking and async drivers over injected ADC, configuration and
//!   diagnostic-output capabilities, so all three can be faked in tests
//!
//! ## Example:
//! ```ignore
//!     // FirmwareAdc: impl of `blocking::Adc` over the shared ADC service,
//!     // config: impl of `ConfigSource` over the parsed config tree.
//!     let mut sensor = ThermocoupleSensor::bind(
//!         FirmwareAdc::handle(),
//!         &config,
//!         "temperature_control",
//!         "hotend",
//!     )?;
//!
//!     let t = sensor.read_temperature();
//!     if t.is_infinite() {
//!         // open circuit, trip thermal protection
//!     }
//!
//!     // on a diagnostic gcode, dump state to the console and restart
//!     // the min/max window
//!     sensor.emit_diagnostic(&mut console);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

pub mod blocking;
pub mod convert;

#[cfg(feature = "async")]
pub mod async_await;

/// Full-scale reference voltage of the ADC, in volts.
pub const ADC_VREF: f32 = 3.3;

/// Configuration key names, scoped by a `(module, instance)` pair when
/// resolved through a [`ConfigSource`].
pub mod keys {
    /// ADC-capable input pin descriptor (required).
    pub const PIN: &str = "pin";
    /// Additive calibration in temperature units (optional, default 0).
    pub const OFFSET: &str = "offset";
    /// Dimensionless multiplier for external amplification (optional,
    /// default 1).
    pub const GAIN: &str = "gain";
    /// Sensor sensitivity in millivolts per degree (optional, default 10).
    pub const MV_PER_C: &str = "mv_per_c";
}

/// Typed lookups into the firmware configuration store.
///
/// Lookups are scoped by a module/instance key pair (for example
/// `("temperature_control", "hotend")`). `None` means the key is absent;
/// required/default semantics belong to the caller.
pub trait ConfigSource {
    /// Resolves a key to its string value.
    fn get_string(&self, module: &str, instance: &str, key: &str) -> Option<&str>;
    /// Resolves a key to its numeric value.
    fn get_number(&self, module: &str, instance: &str, key: &str) -> Option<f32>;
}

/// Sink for human-readable diagnostic lines.
///
/// Any [`core::fmt::Write`] (a UART console, a `String` in tests) is a
/// `DiagnosticSink`; the line terminator is appended here.
pub trait DiagnosticSink {
    /// Writes one formatted line.
    fn write_line(&mut self, args: core::fmt::Arguments<'_>);
}

impl<W: core::fmt::Write> DiagnosticSink for W {
    fn write_line(&mut self, args: core::fmt::Arguments<'_>) {
        let _ = self.write_fmt(args);
        let _ = self.write_char('\n');
    }
}

/// Capability shared by the temperature sensor backends of the host
/// firmware (thermistor tables, thermocouple amplifiers, PT100, ...).
pub trait TemperatureSensor {
    /// Takes one reading and returns degrees Celsius.
    ///
    /// Always returns a value; an open-circuit sensor reads as positive
    /// infinity rather than an error.
    fn read_temperature(&mut self) -> f32;
}

/// Per-sensor calibration constants for the linear transform.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// Additive calibration, subtracted last (temperature units).
    pub offset: f32,
    /// Multiplier compensating amplification between sensor and ADC.
    pub gain: f32,
    /// Sensor sensitivity in millivolts per degree. Must be non-zero.
    pub mv_per_c: f32,
}

impl Calibration {
    /// The defaults applied when the configuration omits a constant:
    /// no offset, unity gain, 10 mV/°C.
    pub const DEFAULT: Self = Self {
        offset: 0.0,
        gain: 1.0,
        mv_per_c: 10.0,
    };

    /// Creates a calibration from explicit constants.
    pub const fn new(offset: f32, gain: f32, mv_per_c: f32) -> Self {
        Self {
            offset,
            gain,
            mv_per_c,
        }
    }

    /// Resolves the optional calibration keys for `(module, instance)`,
    /// falling back to [`Calibration::DEFAULT`] per key.
    ///
    /// A `mv_per_c` of zero is a configuration error: the transform divides
    /// by it, and the resulting inf/NaN would be indistinguishable from the
    /// open-circuit sentinel.
    pub fn from_config<C: ConfigSource>(
        config: &C,
        module: &str,
        instance: &str,
    ) -> Result<Self, BindError> {
        let cal = Self {
            offset: config
                .get_number(module, instance, keys::OFFSET)
                .unwrap_or(Self::DEFAULT.offset),
            gain: config
                .get_number(module, instance, keys::GAIN)
                .unwrap_or(Self::DEFAULT.gain),
            mv_per_c: config
                .get_number(module, instance, keys::MV_PER_C)
                .unwrap_or(Self::DEFAULT.mv_per_c),
        };

        if cal.mv_per_c == 0.0 {
            Err(BindError::ZeroSensitivity)
        } else {
            Ok(cal)
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Fatal configuration errors surfaced while binding a sensor.
///
/// These abort startup; there is no recovery path at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BindError {
    /// The required `pin` key is absent for this module/instance.
    MissingPin,
    /// The `pin` value did not parse as a pin descriptor.
    InvalidPin,
    /// `mv_per_c` resolved to zero.
    ZeroSensitivity,
}

/// One sample with its converted temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// The raw ADC sample.
    pub sample: u32,
    /// The converted temperature in degrees Celsius.
    pub celsius: f32,
}

impl Reading {
    /// True when the reading encodes a sensor fault (open circuit, sample
    /// pinned at the ADC ceiling) rather than a measured temperature.
    pub fn is_fault(&self) -> bool {
        !self.celsius.is_finite()
    }
}

/// Rolling extrema of every temperature computed since construction or the
/// last diagnostic reset.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Extrema {
    /// Lowest temperature seen.
    pub min: f32,
    /// Highest temperature seen.
    pub max: f32,
}

impl Extrema {
    /// Sentinel pair: the first recorded value replaces both ends.
    pub const fn new() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    /// Widens the window to include `celsius`.
    pub fn record(&mut self, celsius: f32) {
        if celsius > self.max {
            self.max = celsius;
        }
        if celsius < self.min {
            self.min = celsius;
        }
    }

    /// Collapses the window to a single value.
    pub fn reset_to(&mut self, celsius: f32) {
        self.min = celsius;
        self.max = celsius;
    }
}

impl Default for Extrema {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn resolve_pin<P, C>(config: &C, module: &str, instance: &str) -> Result<P, BindError>
where
    P: core::str::FromStr,
    C: ConfigSource,
{
    config
        .get_string(module, instance, keys::PIN)
        .ok_or(BindError::MissingPin)?
        .parse()
        .map_err(|_| BindError::InvalidPin)
}

//! An async-await version of the thermocouple driver.
//!
//! Identical semantics to [`crate::blocking`]; only the ADC sample itself is
//! awaited, for firmware whose ADC service completes conversions behind an
//! interrupt or DMA.

use core::str::FromStr;

use crate::{
    convert, resolve_pin, BindError, Calibration, ConfigSource, DiagnosticSink, Extrema, Reading,
};

/// The ADC subsystem capability consumed by this driver, with an awaitable
/// sample.
///
/// Registration and the maximum sample value stay synchronous; only the
/// conversion itself suspends.
#[allow(async_fn_in_trait)]
pub trait Adc {
    /// Identifier for an ADC-capable input.
    type Pin;

    /// Registers `pin` so subsequent reads are serviced.
    fn enable_pin(&mut self, pin: &Self::Pin);
    /// Returns one filtered sample for `pin`, in `[0, max_value]`.
    async fn read(&mut self, pin: &Self::Pin) -> u32;
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
    pub async fn read(&mut self) -> Reading {
        let sample = self.adc.read(&self.pin).await;
        let celsius = convert::sample_to_celsius(sample, self.adc.max_value(), &self.calibration);
        self.extrema.record(celsius);

        Reading { sample, celsius }
    }

    /// Takes one reading and returns degrees Celsius.
    ///
    /// Never fails: an open-circuit sensor reads as positive infinity, which
    /// upstream thermal protection treats as a fault.
    pub async fn read_temperature(&mut self) -> f32 {
        self.read().await.celsius
    }

    /// Writes the raw/converted/calibration state as one line to `sink` and
    /// resets the rolling extrema to the temperature just computed.
    ///
    /// This is the only reset path for the extrema.
    pub async fn emit_diagnostic<D: DiagnosticSink>(&mut self, sink: &mut D) {
        let sample = self.adc.read(&self.pin).await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;
    use core::pin::Pin;
    use core::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    // the fakes below are always ready, so one poll with a no-op waker is
    // enough
    fn block_on<F: Future>(mut fut: F) -> F::Output {
        fn raw() -> RawWaker {
            RawWaker::new(core::ptr::null(), &VTABLE)
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(|_| raw(), |_| {}, |_| {}, |_| {});

        let waker = unsafe { Waker::from_raw(raw()) };
        let mut cx = Context::from_waker(&waker);
        let mut fut = unsafe { Pin::new_unchecked(&mut fut) };
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(v) => v,
            Poll::Pending => panic!("fake future returned Pending"),
        }
    }

    struct FakeAdc {
        samples: Vec<u32>,
        next: usize,
        max: u32,
    }

    impl Adc for FakeAdc {
        type Pin = u8;

        fn enable_pin(&mut self, _pin: &u8) {}

        async fn read(&mut self, _pin: &u8) -> u32 {
            let sample = self.samples[self.next % self.samples.len()];
            self.next += 1;
            sample
        }

        fn max_value(&self) -> u32 {
            self.max
        }
    }

    struct Table<'a>(&'a [(&'a str, &'a str)]);

    impl ConfigSource for Table<'_> {
        fn get_string(&self, _module: &str, _instance: &str, key: &str) -> Option<&str> {
            self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
        }

        fn get_number(&self, module: &str, instance: &str, key: &str) -> Option<f32> {
            self.get_string(module, instance, key)?.parse().ok()
        }
    }

    #[test]
    fn async_reads_match_the_blocking_transform() {
        let adc = FakeAdc {
            samples: vec![1241, 4096],
            next: 0,
            max: 4096,
        };
        let mut sensor =
            ThermocoupleSensor::bind(adc, &Table(&[("pin", "27")]), "temperature_control", "bed")
                .unwrap();

        let t = block_on(sensor.read_temperature());
        assert!((t - 100.0).abs() < 0.1, "t = {t}");

        let fault = block_on(sensor.read());
        assert!(fault.is_fault());
        assert_eq!(sensor.max_temp(), f32::INFINITY);
        assert!((sensor.min_temp() - t).abs() < 1e-3);
    }
}

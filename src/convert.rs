//! The pure sample→temperature math, shared by the blocking and async
//! drivers.

use crate::{Calibration, ADC_VREF};

/// Converts a raw ADC sample to degrees Celsius.
///
/// A sample at or beyond the ADC's representable ceiling means the input is
/// pinned to the rail, which a thermocouple amplifier produces when the
/// sensor is disconnected; that case returns positive infinity, the in-band
/// fault value consumed by thermal-protection logic.
///
/// Otherwise the transform is affine in the sample:
/// `vin = sample * 3.3 / max_sample`, then
/// `(vin * 1000 / mv_per_c) * gain - offset`. The result is not clamped;
/// range sanity is the caller's concern.
pub fn sample_to_celsius(sample: u32, max_sample: u32, cal: &Calibration) -> f32 {
    if sample >= max_sample {
        return f32::INFINITY;
    }

    let vin = sample as f32 * ADC_VREF / max_sample as f32;
    (vin * 1000.0 / cal.mv_per_c) * cal.gain - cal.offset
}

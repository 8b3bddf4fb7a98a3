//! Cold-plasma dispersion law and the unit factors used around it.
//!
//! A pulse observed at frequency `f` arrives later than at `f_max` by
//! `K * (f^-2 - f_max^-2) * DM` seconds, with `f` in GHz and DM in pc cm^-3.

/// Dispersion constant in s GHz^2 pc^-1 cm^3.
pub const DISPERSION_CONSTANT_S: f64 = 4.148808e-3;

/// Dispersion constant as used by the trial-step estimate (pulsar handbook
/// eq. 4.7 form, millisecond cadence).
pub const DISPERSION_CONSTANT_STEP: f64 = 4.148808e6;

/// Frequency scaling applied to the band-centre channels before the step
/// estimate.
pub const STEP_FREQUENCY_UNIT: f64 = 1e-3;

/// Second scaling applied to the channel separation inside the step estimate.
pub const STEP_FREQUENCY_SCALE: f64 = 1e-2;

pub const SECONDS_TO_MILLISECONDS: f64 = 1e3;

/// Lower-edge frequency of channel `index` for a band split into `nchans`
/// equal channels.
pub fn channel_frequency(index: usize, nchans: usize, min_frequency: f64, bandwidth: f64) -> f64 {
    min_frequency + index as f64 * (bandwidth / nchans as f64)
}

pub fn channel_frequencies(nchans: usize, min_frequency: f64, bandwidth: f64) -> Vec<f64> {
    (0..nchans)
        .map(|index| channel_frequency(index, nchans, min_frequency, bandwidth))
        .collect()
}

/// Delay in seconds at `frequency` relative to `max_frequency`.
pub fn dispersion_delay(frequency: f64, max_frequency: f64, dispersion_measure: f64) -> f64 {
    DISPERSION_CONSTANT_S
        * (frequency.powf(-2.0) - max_frequency.powf(-2.0))
        * dispersion_measure
}

/// Whole samples covered by `delay`; halves round to even.
pub fn delay_to_samples(delay: f64, sample_time: f64) -> usize {
    let samples = (delay / sample_time).round_ties_even();
    if samples > 0.0 {
        samples as usize
    } else {
        0
    }
}

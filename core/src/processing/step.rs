use ndarray::ArrayView2;

use crate::math::dispersion::{
    DISPERSION_CONSTANT_STEP, SECONDS_TO_MILLISECONDS, STEP_FREQUENCY_SCALE, STEP_FREQUENCY_UNIT,
};
use crate::prelude::{ensure_positive, ensure_shape, DedispResult};

/// Recommended DM spacing between search trials for `image`'s channelization.
pub fn ddm_step(
    image: ArrayView2<f64>,
    sample_time: f64,
    min_frequency: f64,
    bandwidth: f64,
) -> DedispResult<f64> {
    let (rows, channels) = image.dim();
    ensure_shape(rows, channels)?;
    ddm_step_for_channels(channels, sample_time, min_frequency, bandwidth)
}

/// DM increment at which the smearing across the two band-centre channels
/// changes by about one sample.
pub fn ddm_step_for_channels(
    nchans: usize,
    sample_time: f64,
    min_frequency: f64,
    bandwidth: f64,
) -> DedispResult<f64> {
    ensure_shape(1, nchans)?;
    ensure_positive("sample_time", sample_time)?;
    ensure_positive("min_frequency", min_frequency)?;
    ensure_positive("bandwidth", bandwidth)?;

    let channels = nchans as f64;
    let channel_width = (min_frequency + bandwidth) / channels;
    let lower = channel_width * (channels / 2.0) * STEP_FREQUENCY_UNIT;
    let upper = channel_width * ((channels + 1.0) / 2.0) * STEP_FREQUENCY_UNIT;
    let step_ms = sample_time * SECONDS_TO_MILLISECONDS;

    let ddm = step_ms
        / (DISPERSION_CONSTANT_STEP * (lower * STEP_FREQUENCY_SCALE - upper * STEP_FREQUENCY_SCALE));
    Ok(ddm.abs())
}

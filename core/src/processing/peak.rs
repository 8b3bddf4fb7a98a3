use std::ops::Range;

use crate::math::stats::StatsHelper;
use crate::prelude::{DedispResult, DedispersionError, PeakDescriptor, TimeSeries};
use crate::telemetry::log::LogManager;

const LOG: LogManager = LogManager::for_stage("peak");

/// Default number of samples assumed to belong to the pulse.
pub const DEFAULT_PEAK_WIDTH: usize = 100;

fn check_lengths(times: &[f64], data: &[f64]) -> DedispResult<()> {
    if times.len() != data.len() {
        return Err(DedispersionError::InvalidShape(format!(
            "{} times for {} samples",
            times.len(),
            data.len()
        )));
    }
    Ok(())
}

/// Index of the largest non-NaN sample; earliest index wins ties.
fn peak_index(data: &[f64]) -> DedispResult<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in data.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, current)| value > current) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx).ok_or(DedispersionError::EmptySeries)
}

/// Samples excluded from the noise estimate around `peak`, clamped to the
/// series.
pub fn noise_window(len: usize, peak: usize, peak_width_estimate: usize) -> Range<usize> {
    let half = peak_width_estimate / 2;
    let start = peak.saturating_sub(half).min(len);
    let end = peak.saturating_add(half).min(len);
    start..end
}

pub fn find_peak(times: &[f64], data: &[f64]) -> DedispResult<(f64, f64)> {
    check_lengths(times, data)?;
    let idx = peak_index(data)?;
    Ok((times[idx], data[idx]))
}

/// Every time at which the series reaches its maximum.
pub fn find_peak_times(times: &[f64], data: &[f64]) -> DedispResult<Vec<f64>> {
    check_lengths(times, data)?;
    let peak = data[peak_index(data)?];
    Ok(times
        .iter()
        .zip(data)
        .filter(|&(_, &value)| value == peak)
        .map(|(&time, _)| time)
        .collect())
}

/// Returns `(snr, avg_noise)` for the peak of `data`.
///
/// The noise estimate uses every sample outside
/// `[peak - width / 2, peak + width / 2)`, with the window clamped to the
/// series. NaN samples are left out of the residual.
pub fn signal_to_noise(
    times: &[f64],
    data: &[f64],
    peak_width_estimate: usize,
) -> DedispResult<(f64, f64)> {
    check_lengths(times, data)?;
    let peak = peak_index(data)?;
    let peak_value = data[peak];

    let window = noise_window(data.len(), peak, peak_width_estimate);
    let residual: Vec<f64> = data[..window.start]
        .iter()
        .chain(&data[window.end..])
        .copied()
        .filter(|v| !v.is_nan())
        .collect();
    if residual.is_empty() {
        return Err(DedispersionError::DegenerateNoise(format!(
            "window {:?} covers all {} samples",
            window,
            data.len()
        )));
    }

    let avg_noise = StatsHelper::mean(&residual);
    let rms_noise = StatsHelper::rms(&residual);
    if rms_noise == 0.0 || !rms_noise.is_finite() {
        return Err(DedispersionError::DegenerateNoise(format!(
            "rms noise is {}",
            rms_noise
        )));
    }

    let snr = (peak_value - avg_noise) / rms_noise;
    if !snr.is_finite() {
        return Err(DedispersionError::DegenerateNoise(format!(
            "non-finite S/N from peak {} over rms {}",
            peak_value, rms_noise
        )));
    }
    Ok((snr, avg_noise))
}

/// Full peak summary for a collapsed series.
pub fn analyze(series: &TimeSeries, peak_width_estimate: usize) -> DedispResult<PeakDescriptor> {
    let (peak_time, peak_value) = find_peak(&series.times, &series.values)?;
    let (snr, avg_noise) = signal_to_noise(&series.times, &series.values, peak_width_estimate)?;
    LOG.record(&format!(
        "peak {:.4} at t={:.6}s, S/N {:.2}, noise {:.4}",
        peak_value, peak_time, snr, avg_noise
    ));
    Ok(PeakDescriptor {
        peak_time,
        peak_value,
        snr,
        avg_noise,
    })
}

use ndarray::ArrayView2;

use crate::math::stats::StatsHelper;
use crate::prelude::{ensure_positive, ensure_shape, DedispResult, TimeSeries};
use crate::telemetry::log::LogManager;

const LOG: LogManager = LogManager::for_stage("collapse");

/// Sums a cropped image over frequency.
///
/// `times[k] = (k + wrap_count) * sample_time`, so each retained row keeps
/// its time relative to the uncropped observation start. NaN samples add
/// nothing to a row's sum.
pub fn collapse(
    cropped: ArrayView2<f64>,
    sample_time: f64,
    wrap_count: usize,
) -> DedispResult<TimeSeries> {
    let (rows, channels) = cropped.dim();
    ensure_shape(rows, channels)?;
    ensure_positive("sample_time", sample_time)?;

    let times = (0..rows)
        .map(|k| (k + wrap_count) as f64 * sample_time)
        .collect();
    let values = cropped
        .rows()
        .into_iter()
        .map(|row| StatsHelper::nan_sum(row.iter().copied()))
        .collect();

    LOG.detail(&format!("{} rows over {} channels", rows, channels));
    Ok(TimeSeries { times, values })
}

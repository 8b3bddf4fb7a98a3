use ndarray::{Array2, ArrayView2};

use crate::math::dispersion::{channel_frequency, delay_to_samples, dispersion_delay};
use crate::prelude::{ensure_shape, DedispResult, DispersionParams};
use crate::telemetry::log::LogManager;

const LOG: LogManager = LogManager::for_stage("dedisperse");

/// Image whose columns have each been rolled back by their channel delay.
#[derive(Debug, Clone, PartialEq)]
pub struct DedispersedImage {
    pub data: Array2<f64>,
    /// Rows at each edge polluted by wrap-around; equals `shifts[0]`.
    pub wrap_count: usize,
    /// Per-channel backward shift in samples, lowest frequency first.
    pub shifts: Vec<usize>,
}

impl DedispersedImage {
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn channels(&self) -> usize {
        self.data.ncols()
    }

    /// Re-applies each channel's delay, giving back the image that was
    /// dedispersed. Channels without a recorded shift stay zero; surplus
    /// shifts are ignored.
    pub fn restore(&self) -> Array2<f64> {
        let rows = self.rows();
        let mut restored = Array2::<f64>::zeros(self.data.dim());
        if rows == 0 {
            return restored;
        }
        for ((source, mut target), &shift) in self
            .data
            .columns()
            .into_iter()
            .zip(restored.columns_mut())
            .zip(&self.shifts)
        {
            let offset = shift % rows;
            for row in 0..rows {
                target[(row + offset) % rows] = source[row];
            }
        }
        restored
    }
}

/// Integer sample shift for every channel of an `nchans` band.
pub fn channel_shifts(nchans: usize, params: &DispersionParams) -> DedispResult<Vec<usize>> {
    ensure_shape(1, nchans)?;
    params.validate()?;
    let max_frequency = params.max_frequency();
    Ok((0..nchans)
        .map(|channel| {
            let frequency =
                channel_frequency(channel, nchans, params.min_frequency, params.bandwidth);
            let delay = dispersion_delay(frequency, max_frequency, params.dispersion_measure);
            delay_to_samples(delay, params.sample_time)
        })
        .collect())
}

/// Removes the dispersion delay from `image` at `params.dispersion_measure`.
///
/// Column `c` is rolled toward earlier rows: `out[t, c] = in[(t + s_c) % N, c]`.
/// Samples that roll past row zero come back at the end, so the first and
/// last `wrap_count` rows of the result are not physical and are dropped by
/// the crop stage.
pub fn dedisperse(
    image: ArrayView2<f64>,
    params: &DispersionParams,
) -> DedispResult<DedispersedImage> {
    let (rows, channels) = image.dim();
    ensure_shape(rows, channels)?;
    let shifts = channel_shifts(channels, params)?;

    let mut data = Array2::<f64>::zeros((rows, channels));
    for (channel, &shift) in shifts.iter().enumerate() {
        let offset = shift % rows;
        let source = image.column(channel);
        let mut target = data.column_mut(channel);
        for row in 0..rows {
            target[row] = source[(row + offset) % rows];
        }
    }

    let wrap_count = shifts[0];
    LOG.detail(&format!(
        "DM {:.4} over {}x{} image, shifts {:?}",
        params.dispersion_measure, rows, channels, shifts
    ));

    Ok(DedispersedImage {
        data,
        wrap_count,
        shifts,
    })
}

use ndarray::{s, Array2, ArrayView2};

use crate::prelude::{ensure_shape, DedispResult, DedispersionError};
use crate::telemetry::log::LogManager;

const LOG: LogManager = LogManager::for_stage("crop");

/// Drops `wrap_count` rows from both ends of a dedispersed image.
pub fn crop(image: ArrayView2<f64>, wrap_count: usize) -> DedispResult<Array2<f64>> {
    let (rows, channels) = image.dim();
    ensure_shape(rows, channels)?;
    if wrap_count == 0 {
        return Ok(image.to_owned());
    }
    if wrap_count.saturating_mul(2) >= rows {
        return Err(DedispersionError::CropOutOfRange { wrap_count, rows });
    }

    LOG.detail(&format!(
        "keeping rows {}..{} of {}",
        wrap_count,
        rows - wrap_count,
        rows
    ));
    Ok(image.slice(s![wrap_count..rows - wrap_count, ..]).to_owned())
}

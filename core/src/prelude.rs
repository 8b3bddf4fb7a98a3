use serde::{Deserialize, Serialize};

/// Physical parameters that fix the per-channel delay function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispersionParams {
    /// Trial dispersion measure, pc cm^-3.
    pub dispersion_measure: f64,
    /// Total observed bandwidth, GHz.
    pub bandwidth: f64,
    /// Lowest observed frequency, GHz.
    pub min_frequency: f64,
    /// Sampling interval, seconds.
    pub sample_time: f64,
}

impl DispersionParams {
    pub fn new(
        dispersion_measure: f64,
        bandwidth: f64,
        min_frequency: f64,
        sample_time: f64,
    ) -> Self {
        Self {
            dispersion_measure,
            bandwidth,
            min_frequency,
            sample_time,
        }
    }

    /// Same observation geometry, different trial DM.
    pub fn with_dispersion_measure(self, dispersion_measure: f64) -> Self {
        Self {
            dispersion_measure,
            ..self
        }
    }

    /// Top of the band, GHz.
    pub fn max_frequency(&self) -> f64 {
        self.min_frequency + self.bandwidth
    }

    pub fn validate(&self) -> DedispResult<()> {
        ensure_non_negative("dispersion_measure", self.dispersion_measure)?;
        ensure_positive("bandwidth", self.bandwidth)?;
        ensure_positive("min_frequency", self.min_frequency)?;
        ensure_positive("sample_time", self.sample_time)
    }
}

/// Collapsed intensity against time, one entry per retained image row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }
}

/// Peak statistics extracted from a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakDescriptor {
    pub peak_time: f64,
    pub peak_value: f64,
    pub snr: f64,
    pub avg_noise: f64,
}

impl PeakDescriptor {
    pub fn to_json(&self) -> DedispResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Common error type for every processing stage.
#[derive(thiserror::Error, Debug)]
pub enum DedispersionError {
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("cannot crop {wrap_count} rows from each end of a {rows}-row image")]
    CropOutOfRange { wrap_count: usize, rows: usize },
    #[error("time series has no finite samples")]
    EmptySeries,
    #[error("degenerate noise: {0}")]
    DegenerateNoise(String),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type DedispResult<T> = Result<T, DedispersionError>;

pub(crate) fn ensure_positive(name: &str, value: f64) -> DedispResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DedispersionError::InvalidParameter(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

pub(crate) fn ensure_non_negative(name: &str, value: f64) -> DedispResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DedispersionError::InvalidParameter(format!(
            "{} must be non-negative and finite, got {}",
            name, value
        )))
    }
}

pub(crate) fn ensure_shape(rows: usize, cols: usize) -> DedispResult<()> {
    if rows == 0 || cols == 0 {
        Err(DedispersionError::InvalidShape(format!(
            "{}x{} image needs at least one time row and one channel",
            rows, cols
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DispersionParams {
        DispersionParams::new(10.0, 0.4, 1.0, 0.001)
    }

    #[test]
    fn valid_params_pass_validation() {
        assert!(params().validate().is_ok());
        assert!(params().with_dispersion_measure(0.0).validate().is_ok());
    }

    #[test]
    fn negative_dm_is_rejected() {
        let err = params().with_dispersion_measure(-1.0).validate().unwrap_err();
        assert!(matches!(err, DedispersionError::InvalidParameter(_)));
    }

    #[test]
    fn non_positive_geometry_is_rejected() {
        let mut p = params();
        p.sample_time = 0.0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.bandwidth = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = params();
        p.min_frequency = -1.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn max_frequency_is_top_of_band() {
        assert!((params().max_frequency() - 1.4).abs() < 1e-12);
    }

    #[test]
    fn peak_descriptor_serializes_all_fields() {
        let descriptor = PeakDescriptor {
            peak_time: 0.03,
            peak_value: 4.0,
            snr: 12.5,
            avg_noise: 0.1,
        };
        let json = descriptor.to_json().unwrap();
        assert!(json.contains("\"peak_time\""));
        assert!(json.contains("\"avg_noise\""));
    }
}

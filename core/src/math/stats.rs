pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn rms(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = samples.iter().map(|&v| v * v).sum();
        (sum_sq / samples.len() as f64).sqrt()
    }

    /// Sum that treats NaN as a zero contribution.
    pub fn nan_sum<I>(samples: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        samples.into_iter().filter(|v| !v.is_nan()).sum()
    }
}

use crate::workflow::config::WorkflowConfig;
use anyhow::{bail, Context};
use dispersecore::processing::channel_shifts;
use dispersecore::DispersionParams;
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Synthetic time-frequency image plus the parameters it was dispersed with.
#[derive(Debug, Clone)]
pub struct Observation {
    pub image: Array2<f64>,
    pub params: DispersionParams,
}

impl Observation {
    pub fn rows(&self) -> usize {
        self.image.nrows()
    }

    pub fn channels(&self) -> usize {
        self.image.ncols()
    }
}

fn noise_floor(config: &WorkflowConfig) -> anyhow::Result<Array2<f64>> {
    let rows = config.observation.rows;
    let channels = config.observation.channels;
    rows.checked_mul(channels)
        .context("overflow computing sample count for generator")?;

    let mut rng = StdRng::seed_from_u64(config.pulse.seed);
    let baseline = config.pulse.baseline;
    let noise = config.pulse.noise;
    Ok(Array2::from_shape_fn((rows, channels), |_| {
        if noise > 0.0 {
            baseline + rng.gen_range(-noise..noise)
        } else {
            baseline
        }
    }))
}

/// Builds a noisy image with one pulse delayed across the band by the
/// configured DM. The delayed rows wrap around the time axis the same way
/// dedispersion rolls them back.
pub fn build_observation(config: &WorkflowConfig) -> anyhow::Result<Observation> {
    let rows = config.observation.rows;
    let channels = config.observation.channels;
    if rows == 0 || channels == 0 {
        bail!("observation needs rows and channels, got {}x{}", rows, channels);
    }
    if config.pulse.arrival_row >= rows {
        bail!(
            "pulse arrival row {} outside {}-row observation",
            config.pulse.arrival_row,
            rows
        );
    }

    let params = config.injected_params();
    let shifts = channel_shifts(channels, &params).context("computing injected channel delays")?;
    let mut image = noise_floor(config)?;

    let width = config.pulse.width_samples.max(1);
    for (channel, &shift) in shifts.iter().enumerate() {
        for offset in 0..width {
            let row = (config.pulse.arrival_row + shift + offset) % rows;
            image[[row, channel]] += config.pulse.amplitude;
        }
    }

    log::debug!(
        "synthesized {}x{} observation, DM {:.3}, max delay {} samples",
        rows,
        channels,
        params.dispersion_measure,
        shifts[0]
    );
    Ok(Observation { image, params })
}

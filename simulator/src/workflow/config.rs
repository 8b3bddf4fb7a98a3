use anyhow::Context;
use dispersecore::processing::DEFAULT_PEAK_WIDTH;
use dispersecore::DispersionParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Geometry and cadence of the synthetic observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationConfig {
    pub rows: usize,
    pub channels: usize,
    /// GHz
    pub min_frequency: f64,
    /// GHz
    pub bandwidth: f64,
    /// seconds
    pub sample_time: f64,
}

impl Default for ObservationConfig {
    fn default() -> Self {
        Self {
            rows: 1024,
            channels: 64,
            min_frequency: 1.2,
            bandwidth: 0.3,
            sample_time: 0.001,
        }
    }
}

/// The pulse injected into the observation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub dispersion_measure: f64,
    /// Row at which the pulse reaches the top of the band.
    pub arrival_row: usize,
    pub width_samples: usize,
    pub amplitude: f64,
    pub baseline: f64,
    pub noise: f64,
    pub seed: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            dispersion_measure: 20.0,
            arrival_row: 512,
            width_samples: 2,
            amplitude: 1.0,
            baseline: 1.0,
            noise: 0.2,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// DM to dedisperse at; the injected DM when absent.
    pub trial_dm: Option<f64>,
    pub peak_width_estimate: usize,
    /// Upper end of the trial sweep, pc cm^-3.
    pub max_dm: f64,
    pub max_trials: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trial_dm: None,
            peak_width_estimate: DEFAULT_PEAK_WIDTH,
            max_dm: 50.0,
            max_trials: 512,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub observation: ObservationConfig,
    pub pulse: PulseConfig,
    pub analysis: AnalysisConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(rows: usize, channels: usize, dispersion_measure: f64, seed: u64) -> Self {
        let mut config = Self::default();
        config.observation.rows = rows;
        config.observation.channels = channels;
        config.pulse.dispersion_measure = dispersion_measure;
        config.pulse.arrival_row = rows / 2;
        config.pulse.seed = seed;
        config
    }

    /// Replaces the band and cadence with whichever values are given.
    pub fn override_observation(
        &mut self,
        min_frequency: Option<f64>,
        bandwidth: Option<f64>,
        sample_time: Option<f64>,
    ) {
        if let Some(min_frequency) = min_frequency {
            self.observation.min_frequency = min_frequency;
        }
        if let Some(bandwidth) = bandwidth {
            self.observation.bandwidth = bandwidth;
        }
        if let Some(sample_time) = sample_time {
            self.observation.sample_time = sample_time;
        }
    }

    /// Parameters the synthetic pulse was dispersed with.
    pub fn injected_params(&self) -> DispersionParams {
        DispersionParams::new(
            self.pulse.dispersion_measure,
            self.observation.bandwidth,
            self.observation.min_frequency,
            self.observation.sample_time,
        )
    }

    /// Parameters the pipeline dedisperses with.
    pub fn trial_params(&self) -> DispersionParams {
        let dm = self
            .analysis
            .trial_dm
            .unwrap_or(self.pulse.dispersion_measure);
        self.injected_params().with_dispersion_measure(dm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_overrides_geometry() {
        let cfg = WorkflowConfig::from_args(256, 16, 12.5, 7);
        assert_eq!(cfg.observation.rows, 256);
        assert_eq!(cfg.observation.channels, 16);
        assert_eq!(cfg.trial_params().dispersion_measure, 12.5);
        assert_eq!(cfg.pulse.arrival_row, 128);
        assert_eq!(cfg.pulse.seed, 7);
    }

    #[test]
    fn observation_overrides_reach_dispersion_params() {
        let mut cfg = WorkflowConfig::from_args(256, 16, 10.0, 0);
        cfg.override_observation(Some(0.8), None, Some(0.0005));
        let params = cfg.trial_params();
        assert_eq!(params.min_frequency, 0.8);
        assert_eq!(params.bandwidth, ObservationConfig::default().bandwidth);
        assert_eq!(params.sample_time, 0.0005);

        cfg.override_observation(None, Some(0.25), None);
        assert_eq!(cfg.injected_params().bandwidth, 0.25);
        assert_eq!(cfg.injected_params().min_frequency, 0.8);
    }

    #[test]
    fn trial_dm_overrides_injected_dm() {
        let mut cfg = WorkflowConfig::default();
        cfg.analysis.trial_dm = Some(3.0);
        assert_eq!(cfg.injected_params().dispersion_measure, 20.0);
        assert_eq!(cfg.trial_params().dispersion_measure, 3.0);
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"observation:\n  rows: 300\n  channels: 8\npulse:\n  dispersion_measure: 15.0\nanalysis:\n  trial_dm: 14.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.observation.rows, 300);
        assert_eq!(cfg.observation.sample_time, 0.001);
        assert_eq!(cfg.pulse.dispersion_measure, 15.0);
        assert_eq!(cfg.trial_params().dispersion_measure, 14.0);
        assert_eq!(cfg.analysis.peak_width_estimate, DEFAULT_PEAK_WIDTH);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}

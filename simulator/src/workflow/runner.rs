use crate::generator::profile::Observation;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use dispersecore::processing::ddm_step;
use dispersecore::{
    analyze, collapse, crop, dedisperse, DedispResult, DispersionParams, PeakDescriptor,
    TimeSeries,
};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub struct WorkflowResult {
    pub trial_dm: f64,
    pub wrap_count: usize,
    pub shifts: Vec<usize>,
    pub series: TimeSeries,
    pub peak: PeakDescriptor,
    pub ddm_step: f64,
}

/// Detection statistics for one trial DM of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub dispersion_measure: f64,
    pub wrap_count: usize,
    pub peak: PeakDescriptor,
}

pub struct SweepResult {
    pub step: f64,
    pub trials: Vec<TrialOutcome>,
    pub skipped: usize,
}

impl SweepResult {
    /// Trial with the highest S/N; the lowest DM wins ties.
    pub fn best(&self) -> Option<&TrialOutcome> {
        self.trials.iter().fold(None, |best, trial| match best {
            Some(current) if current.peak.snr >= trial.peak.snr => Some(current),
            _ => Some(trial),
        })
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn execute(&self, observation: &Observation) -> anyhow::Result<WorkflowResult> {
        let params = self.config.trial_params();
        let image = observation.image.view();

        let dedispersed = dedisperse(image, &params).context("dedispersing observation")?;
        let cropped = crop(dedispersed.data.view(), dedispersed.wrap_count)
            .context("cropping wrapped rows")?;
        let series = collapse(cropped.view(), params.sample_time, dedispersed.wrap_count)
            .context("collapsing over frequency")?;
        let peak = analyze(&series, self.config.analysis.peak_width_estimate)
            .context("analysing collapsed series")?;
        let step = ddm_step(
            image,
            params.sample_time,
            params.min_frequency,
            params.bandwidth,
        )
        .context("estimating trial DM step")?;

        Ok(WorkflowResult {
            trial_dm: params.dispersion_measure,
            wrap_count: dedispersed.wrap_count,
            shifts: dedispersed.shifts,
            series,
            peak,
            ddm_step: step,
        })
    }

    /// Dedisperses at every trial DM from zero to `analysis.max_dm`, spaced by
    /// the estimated step. Trials whose wrap-around swallows the image or
    /// whose noise is degenerate are skipped.
    pub fn sweep(&self, observation: &Observation) -> anyhow::Result<SweepResult> {
        let params = self.config.trial_params();
        let step = ddm_step(
            observation.image.view(),
            params.sample_time,
            params.min_frequency,
            params.bandwidth,
        )
        .context("estimating trial DM step")?;
        if step <= 0.0 || !step.is_finite() {
            anyhow::bail!("trial DM step {} cannot drive a sweep", step);
        }

        let max_dm = self.config.analysis.max_dm;
        if !max_dm.is_finite() {
            anyhow::bail!("sweep upper DM {} must be finite", max_dm);
        }
        let max_dm = max_dm.max(0.0);
        let max_trials = self.config.analysis.max_trials;
        let needed = (max_dm / step).floor() + 1.0;
        let count = if needed > max_trials as f64 {
            warn!(
                "sweep to DM {:.2} needs {:.0} trials, capping at {}",
                max_dm, needed, max_trials
            );
            max_trials
        } else {
            needed as usize
        };

        let width = self.config.analysis.peak_width_estimate;
        let results: Vec<DedispResult<TrialOutcome>> = (0..count)
            .into_par_iter()
            .map(|index| {
                let trial = params.with_dispersion_measure(index as f64 * step);
                evaluate_trial(observation, &trial, width)
            })
            .collect();

        let mut trials = Vec::with_capacity(results.len());
        let mut skipped = 0;
        for result in results {
            match result {
                Ok(outcome) => trials.push(outcome),
                Err(err) => {
                    skipped += 1;
                    log::debug!("trial skipped: {}", err);
                }
            }
        }

        info!(
            "swept {} trials at dDM {:.4}, {} skipped",
            trials.len(),
            step,
            skipped
        );
        Ok(SweepResult {
            step,
            trials,
            skipped,
        })
    }
}

fn evaluate_trial(
    observation: &Observation,
    params: &DispersionParams,
    peak_width_estimate: usize,
) -> DedispResult<TrialOutcome> {
    let dedispersed = dedisperse(observation.image.view(), params)?;
    let cropped = crop(dedispersed.data.view(), dedispersed.wrap_count)?;
    let series = collapse(cropped.view(), params.sample_time, dedispersed.wrap_count)?;
    let peak = analyze(&series, peak_width_estimate)?;
    Ok(TrialOutcome {
        dispersion_measure: params.dispersion_measure,
        wrap_count: dedispersed.wrap_count,
        peak,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_observation;

    fn config() -> WorkflowConfig {
        let mut cfg = WorkflowConfig::from_args(256, 16, 10.0, 11);
        cfg.observation.min_frequency = 1.0;
        cfg.observation.bandwidth = 0.4;
        cfg.pulse.arrival_row = 128;
        cfg.pulse.noise = 0.05;
        cfg.pulse.amplitude = 5.0;
        cfg.analysis.max_dm = 20.0;
        cfg
    }

    #[test]
    fn runner_recovers_injected_pulse() {
        let cfg = config();
        let runner = Runner::new(cfg.clone());
        let observation = build_observation(&cfg).unwrap();
        let result = runner.execute(&observation).unwrap();

        assert_eq!(result.wrap_count, result.shifts[0]);
        assert_eq!(
            result.series.len(),
            cfg.observation.rows - 2 * result.wrap_count
        );
        let arrival = cfg.pulse.arrival_row as f64 * cfg.observation.sample_time;
        assert!((result.peak.peak_time - arrival).abs() <= 1.5 * cfg.observation.sample_time);
        assert!(result.peak.snr > 3.0);
        assert!(result.ddm_step > 0.0);
    }

    #[test]
    fn runner_reports_crop_failure() {
        let mut cfg = config();
        cfg.observation.rows = 32;
        cfg.pulse.arrival_row = 4;
        let runner = Runner::new(cfg.clone());
        let observation = build_observation(&cfg).unwrap();
        let err = runner.execute(&observation).err().unwrap();
        assert!(format!("{:#}", err).contains("cropping wrapped rows"));
    }

    #[test]
    fn sweep_peaks_near_injected_dm() {
        let cfg = config();
        let runner = Runner::new(cfg.clone());
        let observation = build_observation(&cfg).unwrap();
        let sweep = runner.sweep(&observation).unwrap();

        assert!(!sweep.trials.is_empty());
        for pair in sweep.trials.windows(2) {
            assert!(pair[1].dispersion_measure > pair[0].dispersion_measure);
        }
        let best = sweep.best().unwrap();
        assert!((best.dispersion_measure - 10.0).abs() < 2.0);
    }

    #[test]
    fn sweep_respects_trial_cap() {
        let mut cfg = config();
        cfg.analysis.max_trials = 3;
        let runner = Runner::new(cfg.clone());
        let observation = build_observation(&cfg).unwrap();
        let sweep = runner.sweep(&observation).unwrap();
        assert!(sweep.trials.len() + sweep.skipped <= 3);
    }

    #[test]
    fn sweep_caps_huge_upper_dm() {
        let mut cfg = config();
        cfg.analysis.max_dm = 1e300;
        cfg.analysis.max_trials = 2;
        let runner = Runner::new(cfg.clone());
        let observation = build_observation(&cfg).unwrap();
        let sweep = runner.sweep(&observation).unwrap();
        assert_eq!(sweep.trials.len() + sweep.skipped, 2);
    }

    #[test]
    fn sweep_rejects_non_finite_upper_dm() {
        let mut cfg = config();
        cfg.analysis.max_dm = f64::INFINITY;
        let runner = Runner::new(cfg.clone());
        let observation = build_observation(&cfg).unwrap();
        let err = runner.sweep(&observation).err().unwrap();
        assert!(err.to_string().contains("must be finite"));

        cfg.analysis.max_dm = f64::NAN;
        let runner = Runner::new(cfg);
        assert!(runner.sweep(&observation).is_err());
    }
}

use crate::workflow::config::WorkflowConfig;
use crate::workflow::runner::{SweepResult, TrialOutcome, WorkflowResult};
use anyhow::Context;
use dispersecore::PeakDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub step: f64,
    pub trials: usize,
    pub skipped: usize,
    pub best: Option<TrialOutcome>,
}

impl From<&SweepResult> for SweepSummary {
    fn from(sweep: &SweepResult) -> Self {
        Self {
            step: sweep.step,
            trials: sweep.trials.len(),
            skipped: sweep.skipped,
            best: sweep.best().cloned(),
        }
    }
}

/// Everything a downstream plotter needs from one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub injected_dm: f64,
    pub trial_dm: f64,
    pub wrap_count: usize,
    pub ddm_step: f64,
    pub peak: PeakDescriptor,
    pub times: Vec<f64>,
    pub collapsed: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepSummary>,
}

impl WorkflowReport {
    pub fn new(
        config: &WorkflowConfig,
        result: &WorkflowResult,
        sweep: Option<&SweepResult>,
    ) -> Self {
        let (times, collapsed): (Vec<f64>, Vec<f64>) = result.series.iter().unzip();
        Self {
            injected_dm: config.pulse.dispersion_measure,
            trial_dm: result.trial_dm,
            wrap_count: result.wrap_count,
            ddm_step: result.ddm_step,
            peak: result.peak,
            times,
            collapsed,
            sweep: sweep.map(SweepSummary::from),
        }
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(self).context("encoding workflow report")?;
        fs::write(path_ref, body)
            .with_context(|| format!("writing workflow report {}", path_ref.display()))?;
        Ok(())
    }
}

use anyhow::Context;
use clap::Parser;
use generator::profile::build_observation;
use report::model::WorkflowReport;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Synthetic dispersed-pulse workflow driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 1024)]
    rows: usize,
    #[arg(long, default_value_t = 64)]
    channels: usize,
    /// Injected dispersion measure, pc cm^-3
    #[arg(long, default_value_t = 20.0)]
    dm: f64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Lowest observed frequency, GHz
    #[arg(long)]
    min_frequency: Option<f64>,
    /// Observed bandwidth, GHz
    #[arg(long)]
    bandwidth: Option<f64>,
    /// Sampling interval, seconds
    #[arg(long)]
    sample_time: Option<f64>,
    /// Dedisperse at this DM instead of the injected one
    #[arg(long)]
    trial_dm: Option<f64>,
    /// Run a trial-DM sweep spaced by the estimated dDM step
    #[arg(long, default_value_t = false)]
    sweep: bool,
    /// Upper end of the sweep
    #[arg(long)]
    max_dm: Option<f64>,
    /// Write a JSON report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.rows, args.channels, args.dm, args.seed)
    };
    workflow_config.override_observation(args.min_frequency, args.bandwidth, args.sample_time);
    if let Some(trial_dm) = args.trial_dm {
        workflow_config.analysis.trial_dm = Some(trial_dm);
    }
    if let Some(max_dm) = args.max_dm {
        workflow_config.analysis.max_dm = max_dm;
    }

    let runner = Runner::new(workflow_config.clone());
    let observation =
        build_observation(&workflow_config).context("building synthetic observation")?;
    let result = runner.execute(&observation)?;

    println!(
        "DM {:.3} -> peak {:.4} at {:.6}s, S/N {:.2}, noise {:.4}, wrap {}, dDM {:.4}",
        result.trial_dm,
        result.peak.peak_value,
        result.peak.peak_time,
        result.peak.snr,
        result.peak.avg_noise,
        result.wrap_count,
        result.ddm_step
    );

    let sweep = if args.sweep {
        let sweep = runner.sweep(&observation)?;
        match sweep.best() {
            Some(best) => println!(
                "Sweep -> {} trials ({} skipped), best DM {:.3} with S/N {:.2}",
                sweep.trials.len(),
                sweep.skipped,
                best.dispersion_measure,
                best.peak.snr
            ),
            None => println!("Sweep -> no usable trials ({} skipped)", sweep.skipped),
        }
        Some(sweep)
    } else {
        None
    };

    if let Some(path) = args.report {
        WorkflowReport::new(runner.config(), &result, sweep.as_ref()).write(&path)?;
        log::info!("report written to {}", path.display());
    }

    Ok(())
}

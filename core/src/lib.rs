//! Dedispersion and detection core for dispersed radio pulses.
//!
//! An intensity image (rows = time, columns = increasing frequency) flows
//! through pure stages: dedisperse, crop, collapse, then peak analysis. The
//! step estimator works from the image geometry alone and feeds an outer
//! trial-DM search that lives outside this crate.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{
    DedispResult, DedispersionError, DispersionParams, PeakDescriptor, TimeSeries,
};
pub use processing::{
    analyze, collapse, crop, ddm_step, dedisperse, find_peak, signal_to_noise, DedispersedImage,
};

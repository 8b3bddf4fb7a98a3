pub mod dispersion;
pub mod stats;

pub use dispersion::{channel_frequencies, delay_to_samples, dispersion_delay};
pub use stats::StatsHelper;

pub mod collapse;
pub mod crop;
pub mod dedisperse;
pub mod peak;
pub mod step;

pub use collapse::collapse;
pub use crop::crop;
pub use dedisperse::{channel_shifts, dedisperse, DedispersedImage};
pub use peak::{
    analyze, find_peak, find_peak_times, noise_window, signal_to_noise, DEFAULT_PEAK_WIDTH,
};
pub use step::{ddm_step, ddm_step_for_channels};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::DispersionParams;
    use ndarray::Array2;

    const ROWS: usize = 100;
    const CHANNELS: usize = 4;
    const ARRIVAL_ROW: usize = 30;

    fn params() -> DispersionParams {
        DispersionParams::new(10.0, 0.4, 1.0, 0.001)
    }

    /// Unit impulse intrinsically at `ARRIVAL_ROW`, delayed per channel.
    fn dispersed_impulse() -> (Array2<f64>, Vec<usize>) {
        let shifts = channel_shifts(CHANNELS, &params()).unwrap();
        let mut image = Array2::<f64>::zeros((ROWS, CHANNELS));
        for (channel, &shift) in shifts.iter().enumerate() {
            image[[ARRIVAL_ROW + shift, channel]] = 1.0;
        }
        (image, shifts)
    }

    #[test]
    fn impulse_realigns_and_collapses_to_single_peak() {
        let (image, shifts) = dispersed_impulse();
        assert_eq!(shifts, vec![20, 13, 8, 3]);
        assert_eq!(image[[50, 0]], 1.0);

        let dedispersed = dedisperse(image.view(), &params()).unwrap();
        assert_eq!(dedispersed.wrap_count, 20);
        for channel in 0..CHANNELS {
            assert_eq!(dedispersed.data[[ARRIVAL_ROW, channel]], 1.0);
        }

        let cropped = crop(dedispersed.data.view(), dedispersed.wrap_count).unwrap();
        assert_eq!(cropped.nrows(), ROWS - 2 * dedispersed.wrap_count);

        let series = collapse(cropped.view(), params().sample_time, dedispersed.wrap_count).unwrap();
        let (peak_time, peak_value) = find_peak(&series.times, &series.values).unwrap();
        assert!((peak_value - 4.0).abs() < 1e-12);
        assert!((peak_time - ARRIVAL_ROW as f64 * 0.001).abs() < 1e-12);

        let above_floor = series.values.iter().filter(|&&v| v > 0.0).count();
        assert_eq!(above_floor, 1);
    }

    #[test]
    fn dedispersion_at_wrong_dm_smears_the_pulse() {
        let (image, _) = dispersed_impulse();
        let dedispersed = dedisperse(image.view(), &params().with_dispersion_measure(0.0)).unwrap();
        let cropped = crop(dedispersed.data.view(), dedispersed.wrap_count).unwrap();
        let series = collapse(cropped.view(), 0.001, dedispersed.wrap_count).unwrap();
        let (_, peak_value) = find_peak(&series.times, &series.values).unwrap();
        assert_eq!(peak_value, 1.0);
    }

    #[test]
    fn noisy_pulse_is_detected_with_high_snr() {
        let rows = 400;
        let shifts = channel_shifts(CHANNELS, &params()).unwrap();
        let mut image = Array2::from_shape_fn((rows, CHANNELS), |(r, c)| {
            1.0 + 0.1 * (((r * 7 + c * 13) % 11) as f64 / 10.0 - 0.5)
        });
        for (channel, &shift) in shifts.iter().enumerate() {
            image[[200 + shift, channel]] += 5.0;
        }

        let dedispersed = dedisperse(image.view(), &params()).unwrap();
        let cropped = crop(dedispersed.data.view(), dedispersed.wrap_count).unwrap();
        let series = collapse(cropped.view(), 0.001, dedispersed.wrap_count).unwrap();
        let descriptor = analyze(&series, DEFAULT_PEAK_WIDTH).unwrap();

        assert!((descriptor.peak_time - 0.2).abs() < 1e-9);
        assert!((descriptor.avg_noise - 4.0).abs() < 0.1);
        assert!(descriptor.snr > 4.0);
    }
}

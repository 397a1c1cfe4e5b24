//! Waveform renderer — evaluates a shape over a sampling config.

use super::oscillator::WaveShape;
use super::sampling::SamplingConfig;

/// Render `shape` at `frequency` Hz scaled by `amplitude` over the time
/// axis of `config`.
///
/// Deterministic and infallible: an unknown shape yields
/// `config.sample_count()` zeros.
pub fn synthesize(
    shape: &WaveShape,
    frequency: f64,
    amplitude: f64,
    config: &SamplingConfig,
) -> Vec<f64> {
    if !shape.is_known() {
        return vec![0.0; config.sample_count()];
    }
    config
        .time_axis()
        .map(|t| amplitude * shape.value_at(frequency, t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> SamplingConfig {
        SamplingConfig::default()
    }

    #[test]
    fn length_matches_sample_count() {
        let config = default_config();
        for shape in [WaveShape::Sine, WaveShape::Square, WaveShape::Sawtooth] {
            for &(f, a) in &[(0.1, 0.0), (2.0, 0.7), (20.0, 1.0)] {
                assert_eq!(synthesize(&shape, f, a, &config).len(), 1000);
            }
        }
        let short = SamplingConfig::new(44100, 0.01).unwrap();
        assert_eq!(synthesize(&WaveShape::Sine, 5.0, 1.0, &short).len(), 441);
    }

    #[test]
    fn deterministic() {
        let config = default_config();
        for shape in [WaveShape::Sine, WaveShape::Square, WaveShape::Sawtooth] {
            let a = synthesize(&shape, 7.3, 0.42, &config);
            let b = synthesize(&shape, 7.3, 0.42, &config);
            let a_bits: Vec<u64> = a.iter().map(|s| s.to_bits()).collect();
            let b_bits: Vec<u64> = b.iter().map(|s| s.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn sine_bounded_by_amplitude() {
        let amplitude = 0.35;
        let samples = synthesize(&WaveShape::Sine, 13.0, amplitude, &default_config());
        for s in samples {
            assert!(s.abs() <= amplitude + 1e-12, "Sine out of range: {s}");
        }
    }

    #[test]
    fn amplitude_scales_linearly() {
        let config = default_config();
        let base = synthesize(&WaveShape::Sine, 3.0, 0.25, &config);
        let scaled = synthesize(&WaveShape::Sine, 3.0, 0.75, &config);
        for (b, s) in base.iter().zip(&scaled) {
            assert!((s - 3.0 * b).abs() < 1e-12, "{s} != 3 * {b}");
        }
    }

    #[test]
    fn square_takes_three_values() {
        let amplitude = 0.6;
        let samples = synthesize(&WaveShape::Square, 4.0, amplitude, &default_config());
        for s in &samples {
            assert!(
                *s == amplitude || *s == -amplitude || *s == 0.0,
                "Square value {s} not in {{-a, 0, a}}"
            );
        }
        assert_eq!(samples[0], 0.0);
        assert!(samples.iter().any(|&s| s == amplitude));
        assert!(samples.iter().any(|&s| s == -amplitude));
    }

    #[test]
    fn sawtooth_half_open_range() {
        let amplitude = 1.0;
        let samples = synthesize(&WaveShape::Sawtooth, 20.0, amplitude, &default_config());
        for s in samples {
            assert!(
                s >= -amplitude && s < amplitude,
                "Saw out of range: {s}"
            );
        }
    }

    #[test]
    fn sawtooth_matches_formula() {
        let config = default_config();
        let samples = synthesize(&WaveShape::Sawtooth, 20.0, 1.0, &config);
        for (i, s) in samples.iter().enumerate() {
            let t = i as f64 / 1000.0;
            let x = 20.0 * t;
            let expected = 2.0 * (x - x.floor()) - 1.0;
            assert!((s - expected).abs() < 1e-9, "sample {i}: {s} vs {expected}");
        }
    }

    #[test]
    fn unknown_shape_is_silence() {
        let shape = WaveShape::from("glitch");
        let samples = synthesize(&shape, 5.0, 0.5, &default_config());
        assert_eq!(samples.len(), 1000);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_amplitude_is_flat() {
        let samples = synthesize(&WaveShape::Sawtooth, 9.0, 0.0, &default_config());
        assert!(samples.iter().all(|&s| s == 0.0));
    }
}

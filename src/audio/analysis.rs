//! Per-column audio statistics: peak envelope, RMS, zero-crossing rate and
//! the three-band energy estimate derived from them.
//!
//! The band split is a placeholder heuristic, not spectral analysis: the
//! zero-crossing rate stands in for spectral centroid, so a filter bank or
//! FFT analyzer would produce different (correct) band energies. The formula
//! is kept stable because the rendered colors depend on it.

/// Added to denominators so silent blocks divide cleanly.
const ENERGY_EPSILON: f32 = 0.001;

/// Share of RMS added to the low band per unit of envelope asymmetry.
const PEAKINESS_WEIGHT: f32 = 0.3;

/// Replace non-finite samples with silence and clamp to the nominal range.
#[inline]
pub fn sanitize_sample(sample: f32) -> f32 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Summary of one block of samples (one waveform column).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlockStats {
    /// Most negative sample, never above 0.
    pub min: f32,
    /// Most positive sample, never below 0.
    pub max: f32,
    pub rms: f32,
    /// Sign changes per sample.
    pub zero_crossing_rate: f32,
}

impl BlockStats {
    /// Scan a block once. The envelope starts at zero, so a block with no
    /// negative excursion reports `min == 0`.
    pub fn measure(block: &[f32]) -> Self {
        if block.is_empty() {
            return Self::default();
        }

        let mut min = 0.0f32;
        let mut max = 0.0f32;
        let mut sum_sq = 0.0f32;
        let mut crossings = 0usize;
        let mut prev: Option<f32> = None;

        for &raw in block {
            let s = sanitize_sample(raw);
            min = min.min(s);
            max = max.max(s);
            sum_sq += s * s;

            if let Some(p) = prev {
                if (s >= 0.0 && p < 0.0) || (s < 0.0 && p >= 0.0) {
                    crossings += 1;
                }
            }
            prev = Some(s);
        }

        Self {
            min,
            max,
            rms: (sum_sq / block.len() as f32).sqrt(),
            zero_crossing_rate: crossings as f32 / block.len() as f32,
        }
    }

    /// `(|min|, max)` as stored in a level's amplitude array.
    pub fn envelope(&self) -> (f32, f32) {
        (self.min.abs(), self.max)
    }

    /// Envelope asymmetry in `[-1, 1]`.
    pub fn peakiness(&self) -> f32 {
        let neg = self.min.abs();
        (self.max - neg) / (self.max + neg + ENERGY_EPSILON)
    }

    /// Low / mid / high energy estimate, normalized to sum to ~1.
    ///
    /// `low = rms*(1 - 2*zcr) + |peakiness|*rms*0.3`, `mid = rms*0.5`,
    /// `high = rms*3*zcr`, each floored at zero before normalizing.
    /// Silent blocks yield all zeros.
    pub fn band_energies(&self) -> [f32; 3] {
        let rms = self.rms;
        let zcr = self.zero_crossing_rate;

        let low = rms * (1.0 - zcr * 2.0) + self.peakiness().abs() * rms * PEAKINESS_WEIGHT;
        let mid = rms * 0.5;
        let high = rms * zcr * 3.0;

        let bands = [low.max(0.0), mid.max(0.0), high.max(0.0)];
        let sum: f32 = bands.iter().sum();
        if sum <= ENERGY_EPSILON * ENERGY_EPSILON {
            return [0.0; 3];
        }

        bands.map(|b| (b / sum).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_calculate_rms() {
        // RMS of a sine wave should be 1/sqrt(2) ≈ 0.707
        let samples: Vec<f32> = (0..1000)
            .map(|i| (2.0 * PI * i as f32 / 100.0).sin())
            .collect();
        let rms = calculate_rms(&samples);
        assert!((rms - 0.707).abs() < 0.01);
    }

    #[test]
    fn test_sine_rms() {
        // RMS of a sine wave should be 1/sqrt(2) ≈ 0.707
        let samples: Vec<f32> = (0..1000)
            .map(|i| (2.0 * PI * i as f32 / 100.0).sin())
            .collect();
        let stats = BlockStats::measure(&samples);
        assert!((stats.rms - 0.707).abs() < 0.01);
    }

    #[test]
    fn test_non_finite_samples_are_silence() {
        let stats = BlockStats::measure(&[f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.5]);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.5);
        assert!(stats.rms.is_finite());
        assert!((stats.rms - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_envelope_stores_negative_magnitude() {
        let stats = BlockStats::measure(&[-0.8, 0.2, -0.1, 0.4]);
        assert_eq!(stats.envelope(), (0.8, 0.4));
    }

    #[test]
    fn test_positive_only_block_has_zero_min() {
        let stats = BlockStats::measure(&[0.1, 0.3, 0.2]);
        assert_eq!(stats.envelope(), (0.0, 0.3));
    }

    #[test]
    fn test_zero_crossing_rate_alternating() {
        let block: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        let stats = BlockStats::measure(&block);
        assert!((stats.zero_crossing_rate - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_band_energies_normalized() {
        let block: Vec<f32> = (0..512)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44100.0).sin() * 0.7)
            .collect();
        let bands = BlockStats::measure(&block).band_energies();
        let sum: f32 = bands.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "bands should sum to 1, got {}", sum);
        assert!(bands.iter().all(|&b| (0.0..=1.0).contains(&b)));
    }

    #[test]
    fn test_low_tone_weights_low_band() {
        let block: Vec<f32> = (0..1024)
            .map(|i| (2.0 * PI * 60.0 * i as f32 / 44100.0).sin())
            .collect();
        let [low, _mid, high] = BlockStats::measure(&block).band_energies();
        assert!(low > high, "60 Hz tone: low {} should exceed high {}", low, high);
    }

    #[test]
    fn test_noisy_block_weights_high_band() {
        let block: Vec<f32> = (0..1024).map(|i| if i % 2 == 0 { 0.6 } else { -0.6 }).collect();
        let [low, _mid, high] = BlockStats::measure(&block).band_energies();
        assert!(high > low);
        assert_eq!(low, 0.0);
    }

    #[test]
    fn test_silence_has_no_band_energy() {
        let bands = BlockStats::measure(&[0.0; 256]).band_energies();
        assert_eq!(bands, [0.0; 3]);
    }
}

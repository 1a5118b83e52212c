//! Zoom to detail-level mapping and cross-fade between adjacent levels.
//!
//! Everything here is pure and independent of GPU state.

use super::types::{WaveformLod, WaveformPyramid};

/// Seconds of audio spanning the viewport at zoom 1.0.
pub const BASE_SECONDS_VISIBLE: f64 = 10.0;

/// The two levels bound for a frame and the weight of the coarser one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LodBlendInfo {
    pub primary_index: usize,
    pub secondary_index: usize,
    /// 0.0 = all primary, 1.0 = all secondary.
    pub blend_factor: f64,
}

impl LodBlendInfo {
    /// One level on its own, no cross-fade.
    pub fn single(index: usize) -> Self {
        Self {
            primary_index: index,
            secondary_index: index,
            blend_factor: 0.0,
        }
    }
}

/// Samples per screen pixel wanted for this viewport and zoom.
///
/// Higher zoom means fewer samples per pixel (more detail).
pub fn target_samples_per_pixel(viewport_width_px: f64, sample_rate: f64, zoom: f64) -> f64 {
    let seconds_visible = BASE_SECONDS_VISIBLE / zoom;
    let samples_visible = seconds_visible * sample_rate;
    samples_visible / viewport_width_px
}

/// Pick the two levels bracketing `target` and the log-space blend between them.
///
/// Level spacing is geometric, so interpolating in log space keeps the
/// transition speed even across the ladder.
pub fn select_blend(pyramid: &WaveformPyramid, target: f64) -> LodBlendInfo {
    select_blend_in(&pyramid.lods, target)
}

/// [`select_blend`] over a bare level slice.
pub fn select_blend_in(lods: &[WaveformLod], target: f64) -> LodBlendInfo {
    let (first, last) = match (lods.first(), lods.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return LodBlendInfo::default(),
    };
    let last_index = lods.len() - 1;

    if target.is_nan() || target < first.samples_per_pixel as f64 {
        return LodBlendInfo::single(0);
    }
    if target > last.samples_per_pixel as f64 {
        return LodBlendInfo::single(last_index);
    }
    if lods.len() == 1 {
        return LodBlendInfo::single(0);
    }

    let i = lods
        .windows(2)
        .position(|pair| {
            let lower = pair[0].samples_per_pixel as f64;
            let upper = pair[1].samples_per_pixel as f64;
            lower <= target && target <= upper
        })
        .unwrap_or(last_index - 1);

    let lower = lods[i].samples_per_pixel as f64;
    let upper = lods[i + 1].samples_per_pixel as f64;
    let span = upper.ln() - lower.ln();
    let blend_factor = if span > 0.0 {
        ((target.ln() - lower.ln()) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };

    LodBlendInfo {
        primary_index: i,
        secondary_index: i + 1,
        blend_factor,
    }
}

/// Index of the level whose samples-per-pixel is closest to `target`.
/// Ties keep the finer level.
pub fn nearest_lod_index(pyramid: &WaveformPyramid, target: f64) -> usize {
    let mut best_index = 0;
    let mut best_diff = f64::INFINITY;

    for (i, lod) in pyramid.lods.iter().enumerate() {
        let diff = (lod.samples_per_pixel as f64 - target).abs();
        if diff < best_diff {
            best_diff = diff;
            best_index = i;
        }
    }

    best_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::types::WaveformBandConfig;

    fn ladder(spps: &[u32]) -> WaveformPyramid {
        let lods = spps
            .iter()
            .map(|&spp| WaveformLod {
                samples_per_pixel: spp,
                length_in_pixels: 1,
                amplitude: vec![0.0; 2],
                band_energies: vec![0.0; 3],
            })
            .collect();
        WaveformPyramid {
            total_samples: 1,
            sample_rate: 44100,
            bands: WaveformBandConfig::new(3, 44100),
            lods,
        }
    }

    #[test]
    fn test_target_samples_per_pixel() {
        assert!((target_samples_per_pixel(1000.0, 44100.0, 1.0) - 441.0).abs() < 1e-9);
        assert!((target_samples_per_pixel(1000.0, 44100.0, 2.0) - 220.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_below_first() {
        let p = ladder(&[64, 128, 256]);
        assert_eq!(select_blend(&p, 10.0), LodBlendInfo::single(0));
    }

    #[test]
    fn test_clamp_above_last() {
        let p = ladder(&[64, 128, 256]);
        assert_eq!(select_blend(&p, 1e6), LodBlendInfo::single(2));
    }

    #[test]
    fn test_geometric_mean_is_half() {
        let p = ladder(&[64, 128, 256]);
        let info = select_blend(&p, (128.0f64 * 256.0).sqrt());
        assert_eq!((info.primary_index, info.secondary_index), (1, 2));
        assert!((info.blend_factor - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_exact_level_boundary() {
        let p = ladder(&[64, 128, 256]);
        let at_first = select_blend(&p, 64.0);
        assert_eq!(at_first.primary_index, 0);
        assert_eq!(at_first.blend_factor, 0.0);

        let at_middle = select_blend(&p, 128.0);
        assert!(at_middle.blend_factor == 0.0 || at_middle.blend_factor == 1.0);

        let at_last = select_blend(&p, 256.0);
        assert_eq!((at_last.primary_index, at_last.secondary_index), (1, 2));
        assert_eq!(at_last.blend_factor, 1.0);
    }

    #[test]
    fn test_single_level_pyramid() {
        let p = ladder(&[512]);
        assert_eq!(select_blend(&p, 512.0), LodBlendInfo::single(0));
    }

    #[test]
    fn test_empty_pyramid_defaults() {
        let p = ladder(&[]);
        assert_eq!(select_blend(&p, 300.0), LodBlendInfo::default());
        assert_eq!(nearest_lod_index(&p, 300.0), 0);
    }

    #[test]
    fn test_nearest_lod_index() {
        let p = ladder(&[64, 128, 256, 512]);
        assert_eq!(nearest_lod_index(&p, 0.0), 0);
        assert_eq!(nearest_lod_index(&p, 200.0), 2);
        assert_eq!(nearest_lod_index(&p, 441.0), 3);
        assert_eq!(nearest_lod_index(&p, 96.0), 0);
    }
}

//! Integration tests for zoom to level selection.

mod fixtures;

use deck_waveform::waveform::{nearest_lod_index, select_blend, target_samples_per_pixel};
use fixtures::{minute_pyramid, SAMPLE_RATE};

#[test]
fn test_target_density_scenario() {
    let sr = SAMPLE_RATE as f64;
    assert!((target_samples_per_pixel(1000.0, sr, 1.0) - 441.0).abs() < 1e-9);
    assert!((target_samples_per_pixel(1000.0, sr, 2.0) - 220.5).abs() < 1e-9);
}

#[test]
fn test_zoom_sweep_stays_in_bounds() {
    let pyramid = minute_pyramid();
    let last = pyramid.lods.len() - 1;

    let mut previous_spp = f64::INFINITY;
    for step in 0..400 {
        let zoom = 0.01 * 1.03f64.powi(step);
        let target = target_samples_per_pixel(1280.0, SAMPLE_RATE as f64, zoom);
        let blend = select_blend(&pyramid, target);

        assert!((0.0..=1.0).contains(&blend.blend_factor));
        assert!(blend.primary_index <= blend.secondary_index);
        assert!(blend.secondary_index <= last);
        assert!(blend.secondary_index - blend.primary_index <= 1);

        // Effective density never increases as zoom increases.
        let p = pyramid.lods[blend.primary_index].samples_per_pixel as f64;
        let s = pyramid.lods[blend.secondary_index].samples_per_pixel as f64;
        let effective = (p.ln() * (1.0 - blend.blend_factor) + s.ln() * blend.blend_factor).exp();
        assert!(effective <= previous_spp + 1e-6, "zoom {zoom}");
        previous_spp = effective;
    }
}

#[test]
fn test_clamps_at_both_ends() {
    let pyramid = minute_pyramid();
    let last = pyramid.lods.len() - 1;

    let fine = select_blend(&pyramid, 1.0);
    assert_eq!((fine.primary_index, fine.secondary_index, fine.blend_factor), (0, 0, 0.0));

    let coarse = select_blend(&pyramid, 1e9);
    assert_eq!(
        (coarse.primary_index, coarse.secondary_index, coarse.blend_factor),
        (last, last, 0.0)
    );
}

#[test]
fn test_geometric_mean_blends_halfway() {
    let pyramid = minute_pyramid();
    for i in 0..pyramid.lods.len() - 1 {
        let a = pyramid.lods[i].samples_per_pixel as f64;
        let b = pyramid.lods[i + 1].samples_per_pixel as f64;
        let blend = select_blend(&pyramid, (a * b).sqrt());
        assert_eq!(blend.primary_index, i);
        assert_eq!(blend.secondary_index, i + 1);
        assert!((blend.blend_factor - 0.5).abs() < 1e-9);
    }
}

#[test]
fn test_exact_level_resolves_to_boundary() {
    let pyramid = minute_pyramid();
    let spp = pyramid.lods[2].samples_per_pixel as f64;
    let blend = select_blend(&pyramid, spp);
    let landed = if blend.blend_factor == 0.0 {
        blend.primary_index
    } else {
        assert_eq!(blend.blend_factor, 1.0);
        blend.secondary_index
    };
    assert_eq!(landed, 2);
}

#[test]
fn test_nearest_level_for_fallback() {
    let pyramid = minute_pyramid();
    assert_eq!(nearest_lod_index(&pyramid, 0.0), 0);
    assert_eq!(nearest_lod_index(&pyramid, 1e9), pyramid.lods.len() - 1);
    assert_eq!(nearest_lod_index(&pyramid, 1100.0), 1);
}

//! Integration tests for decoding audio files into pyramids.

mod fixtures;

use std::path::Path;

use deck_waveform::audio::{generate_deck_track, generate_sine};
use deck_waveform::gpu::{DeckWaveformRenderer, OffscreenTarget};
use deck_waveform::{
    build_pyramid, load_audio, load_mono, AudioError, BuildConfig, DeckSession, RendererConfig,
    SessionError, TrackState,
};
use fixtures::{gpu, write_wav, SAMPLE_RATE};

const PCM16_STEP: f32 = 1.0 / i16::MAX as f32;

#[test]
fn test_load_mono_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    let tone = generate_sine(440.0, SAMPLE_RATE, 0.5, 0.8);
    write_wav(&path, &tone, SAMPLE_RATE, 1).unwrap();

    let audio = load_audio(&path).unwrap();
    assert_eq!(audio.sample_rate, SAMPLE_RATE);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.num_frames(), tone.len());
    assert!((audio.duration() - 0.5).abs() < 1e-3);

    for (decoded, original) in audio.samples.iter().zip(&tone).step_by(97) {
        assert!(
            (decoded - original).abs() <= 2.0 * PCM16_STEP,
            "decoded {} vs {}",
            decoded,
            original
        );
    }
}

#[test]
fn test_stereo_folds_to_mono() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");

    // Left carries the signal, right is silent: mono is half the signal.
    let left = generate_sine(220.0, SAMPLE_RATE, 0.25, 0.6);
    let interleaved: Vec<f32> = left.iter().flat_map(|&s| [s, 0.0]).collect();
    write_wav(&path, &interleaved, SAMPLE_RATE, 2).unwrap();

    let (mono, sample_rate) = load_mono(&path).unwrap();
    assert_eq!(sample_rate, SAMPLE_RATE);
    assert_eq!(mono.len(), left.len());
    for (m, l) in mono.iter().zip(&left).step_by(53) {
        assert!((m - l * 0.5).abs() <= 2.0 * PCM16_STEP);
    }
}

#[test]
fn test_pyramid_from_decoded_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.wav");
    // Headroom so 16-bit writing never clips.
    let track: Vec<f32> = generate_deck_track(128.0, SAMPLE_RATE, 8.0)
        .into_iter()
        .map(|s| s * 0.4)
        .collect();
    write_wav(&path, &track, SAMPLE_RATE, 1).unwrap();

    let (mono, sample_rate) = load_mono(&path).unwrap();
    let from_file = build_pyramid(&mono, sample_rate);
    let from_memory = build_pyramid(&track, SAMPLE_RATE);

    from_file.validate().unwrap();
    assert_eq!(from_file.total_samples, track.len() as u64);
    assert_eq!(from_file.lods.len(), from_memory.lods.len());

    for (a, b) in from_file.lods.iter().zip(&from_memory.lods) {
        assert_eq!(a.samples_per_pixel, b.samples_per_pixel);
        assert_eq!(a.length_in_pixels, b.length_in_pixels);
        for (x, y) in a.amplitude.iter().zip(&b.amplitude) {
            assert!((x - y).abs() < 1e-3);
        }
    }
}

#[test]
fn test_missing_file() {
    let err = load_audio(Path::new("/nonexistent/track.wav")).unwrap_err();
    assert!(matches!(err, AudioError::Io(_)));
}

#[test]
fn test_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("noise.wav");
    std::fs::write(&path, b"definitely not a riff header").unwrap();

    assert!(load_mono(&path).is_err());
}

#[tokio::test]
async fn test_session_load_file() {
    let ctx = match gpu().await {
        Some(ctx) => ctx,
        None => return,
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.wav");
    write_wav(&path, &generate_deck_track(124.0, SAMPLE_RATE, 4.0), SAMPLE_RATE, 1).unwrap();

    let target = OffscreenTarget::new(&ctx.device, 320, 80);
    let renderer = DeckWaveformRenderer::new(ctx, target, RendererConfig::default()).unwrap();
    let mut session = DeckSession::new(renderer, BuildConfig::default()).unwrap();

    let pyramid = session.load_file(&path).unwrap();
    assert_eq!(session.state(), TrackState::Ready);
    assert_eq!(pyramid.sample_rate, SAMPLE_RATE);

    let err = session.load_file(&dir.path().join("missing.wav")).unwrap_err();
    assert!(matches!(err, SessionError::Audio(_)));
    assert_eq!(session.state(), TrackState::Ready);
}

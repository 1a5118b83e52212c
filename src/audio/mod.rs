//! Audio input for the pyramid builder.
//!
//! This module provides:
//! - Audio file loading via Symphonia (WAV, MP3, FLAC, AAC)
//! - Per-block envelope statistics and the heuristic band split
//! - Deterministic synthetic signals for tests and demos

pub mod analysis;
pub mod loader;
pub mod synth;

pub use analysis::{sanitize_sample, BlockStats};
pub use loader::{load_audio, load_mono, AudioData, AudioError};
pub use synth::{
    generate_deck_track, generate_kick, generate_sine, generate_white_noise,
};

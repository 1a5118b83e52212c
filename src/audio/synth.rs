//! Synthetic PCM for tests, benches and the demo.
//!
//! Every generator is deterministic so pyramids built from its output
//! can be compared byte for byte.

use std::f32::consts::PI;

/// Generate a sine wave.
///
/// # Arguments
/// * `frequency` - Frequency in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `duration` - Duration in seconds
/// * `amplitude` - Amplitude (0.0 to 1.0)
pub fn generate_sine(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Seeded white noise from a 64-bit LCG.
pub fn generate_white_noise(sample_rate: u32, duration: f32, amplitude: f32, seed: u64) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    let mut state = seed;
    (0..num_samples)
        .map(|_| amplitude * next_noise(&mut state))
        .collect()
}

fn next_noise(state: &mut u64) -> f32 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    // Top 24 bits map exactly onto an f32 in [0, 1).
    ((*state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
}

/// One kick drum hit, pitch falling from 150 Hz to 50 Hz.
pub fn generate_kick(sample_rate: u32) -> Vec<f32> {
    let num_samples = (0.15 * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let freq = 50.0 + 100.0 * (-t * 30.0).exp();
            let amp = (-t * 15.0).exp();
            amp * (2.0 * PI * freq * t).sin()
        })
        .collect()
}

/// A short dance-music loop: four-on-the-floor kicks, off-beat noise
/// hats and a bassline that drops out every fourth bar.
///
/// Gives the pyramid builder distinct low, mid and high content.
pub fn generate_deck_track(bpm: f32, sample_rate: u32, duration: f32) -> Vec<f32> {
    let num_samples = (duration * sample_rate as f32) as usize;
    let samples_per_beat = (60.0 / bpm * sample_rate as f32) as usize;
    let mut samples = vec![0.0f32; num_samples];
    if samples_per_beat == 0 {
        return samples;
    }

    let kick = generate_kick(sample_rate);
    let hat_len = (sample_rate as f32 * 0.04) as usize;
    let mut noise_state = 0x5eed_u64;

    for (beat, start) in (0..num_samples).step_by(samples_per_beat).enumerate() {
        for (dst, &k) in samples[start..].iter_mut().zip(&kick) {
            *dst += 0.8 * k;
        }

        let hat_start = start + samples_per_beat / 2;
        let hat_end = (hat_start + hat_len).min(num_samples);
        for i in hat_start..hat_end {
            let t = (i - hat_start) as f32 / sample_rate as f32;
            samples[i] += 0.25 * (-t * 80.0).exp() * next_noise(&mut noise_state);
        }

        let bar = beat / 4;
        if bar % 4 != 3 {
            let bass_end = (start + samples_per_beat).min(num_samples);
            let freq = if beat % 2 == 0 { 55.0 } else { 82.4 };
            for (i, sample) in samples[start..bass_end].iter_mut().enumerate() {
                let t = i as f32 / sample_rate as f32;
                *sample += 0.3 * (2.0 * PI * freq * t).sin();
            }
        }
    }

    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > 1.0 {
        for s in &mut samples {
            *s /= peak;
        }
    }

    samples
}

//! Render a deck waveform offscreen and report what reached the texture.
//!
//! Run with:
//!     cargo run --example headless_deck [track.wav] [config.json]
//!
//! Without a track a synthetic 128 BPM loop is used.

use std::path::PathBuf;

use anyhow::{Context, Result};
use deck_waveform::audio::generate_deck_track;
use deck_waveform::gpu::{DeckWaveformRenderer, GpuContext, OffscreenTarget};
use deck_waveform::{BuildConfig, DeckSession, RendererConfig, WaveformKnobs};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 200;
const FRAMES: u32 = 120;
const FPS: f64 = 60.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args().skip(1);
    let track = args.next().map(PathBuf::from);
    let config = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path))?;
            RendererConfig::from_json(&json).context("parsing renderer config")?
        }
        // Slightly lifted highs so hats read against the kick.
        None => RendererConfig::default().with_knobs(
            WaveformKnobs::default()
                .with_band_gains(1.0, 0.9, 1.3)
                .with_saturation(1.1),
        ),
    };

    let ctx = pollster::block_on(GpuContext::new()).context("creating GPU context")?;
    let info = ctx.adapter_info();
    log::info!("Using {} ({:?})", info.name, info.backend);

    let target = OffscreenTarget::new(&ctx.device, WIDTH, HEIGHT);
    let renderer = DeckWaveformRenderer::new(ctx.clone(), target, config)?;
    let mut session = DeckSession::new(renderer, BuildConfig::default())?;

    let pyramid = match &track {
        Some(path) => session
            .load_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let pcm = generate_deck_track(128.0, 44100, 90.0);
            session.load_pcm(&pcm, 44100)?
        }
    };
    log::info!(
        "Track: {:.1}s, levels {:?}",
        pyramid.duration(),
        pyramid
            .lods
            .iter()
            .map(|lod| lod.samples_per_pixel)
            .collect::<Vec<_>>()
    );

    session.set_autoplay(true);
    session.renderer_mut().set_zoom(2.0);

    let dt = 1.0 / FPS;
    for i in 0..FRAMES {
        // Slow zoom-out across the run to exercise level blending.
        if i % 30 == 0 {
            let zoom = session.renderer().zoom() * 0.7;
            session.renderer_mut().set_zoom(zoom);
            let blend = session.renderer().blend_info();
            log::info!(
                "zoom {:.2}: levels {} -> {} at {:.2}",
                zoom,
                blend.primary_index,
                blend.secondary_index,
                blend.blend_factor
            );
        }
        session.tick(dt, i as f64 * dt);
    }

    let pixels = session.renderer().target().read_pixels(&ctx)?;
    let [r, g, b] = session.renderer().config().display.clear_color;
    let background = [r, g, b].map(|c| (c * 255.0).round() as i32);
    let lit = pixels
        .chunks_exact(4)
        .filter(|px| {
            px[..3]
                .iter()
                .zip(background)
                .any(|(&p, bg)| (p as i32 - bg).abs() > 2)
        })
        .count();

    println!(
        "{} frames submitted, playhead {:.2}s, {:.1}% of pixels drawn",
        session.renderer().frames_submitted(),
        session
            .renderer()
            .transport()
            .position_seconds(pyramid.sample_rate),
        100.0 * lit as f64 / (WIDTH * HEIGHT) as f64
    );

    session.destroy();
    Ok(())
}

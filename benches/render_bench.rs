//! Benchmarks for GPU upload and frame submission.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deck_waveform::gpu::{DeckWaveformRenderer, GpuContext, OffscreenTarget, WaveformResources};
use deck_waveform::{synthetic_pyramid, BuildConfig, DeckTransportState, RendererConfig, SamplerFilter};

fn context() -> Option<GpuContext> {
    match pollster::block_on(GpuContext::new()) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            eprintln!("Skipping GPU benchmarks: {}", e);
            None
        }
    }
}

fn bench_frame(c: &mut Criterion) {
    let ctx = match context() {
        Some(ctx) => ctx,
        None => return,
    };
    let mut group = c.benchmark_group("Deck Frame");

    let pyramid = Arc::new(synthetic_pyramid(360.0, 44100, 128.0, 3, &BuildConfig::default()));
    let resolutions = [(640, 120, "640x120"), (1280, 200, "1280x200"), (2560, 400, "2560x400")];

    for (width, height, name) in resolutions {
        let target = OffscreenTarget::new(&ctx.device, width, height);
        let mut renderer = match DeckWaveformRenderer::create(
            pyramid.clone(),
            target,
            ctx.clone(),
            RendererConfig::default(),
        ) {
            Ok(r) => r,
            Err(_) => continue,
        };
        renderer.set_zoom(1.7);

        let mut playhead = 0.0;
        group.bench_function(BenchmarkId::new("frame", name), |b| {
            b.iter(|| {
                playhead += 735.0;
                renderer.update_transport(DeckTransportState {
                    playhead_samples: playhead,
                    ..Default::default()
                });
                black_box(renderer.frame(1.0 / 60.0, 0.0));
                let _ = ctx.device.poll(wgpu::PollType::wait_indefinitely());
            });
        });
    }

    group.finish();
}

fn bench_zoom_rebind(c: &mut Criterion) {
    let ctx = match context() {
        Some(ctx) => ctx,
        None => return,
    };
    let pyramid = Arc::new(synthetic_pyramid(360.0, 44100, 128.0, 3, &BuildConfig::default()));
    let target = OffscreenTarget::new(&ctx.device, 1280, 200);
    let mut renderer =
        match DeckWaveformRenderer::create(pyramid, target, ctx.clone(), RendererConfig::default()) {
            Ok(r) => r,
            Err(_) => return,
        };

    let zooms: Vec<f64> = (0..64).map(|i| 0.5 + i as f64 * 0.25).collect();
    c.bench_function("zoom_sweep_rebind", |b| {
        b.iter(|| {
            for &zoom in &zooms {
                renderer.set_zoom(black_box(zoom));
            }
        });
    });
}

fn bench_upload(c: &mut Criterion) {
    let ctx = match context() {
        Some(ctx) => ctx,
        None => return,
    };
    let mut group = c.benchmark_group("Pyramid Upload");

    for minutes in [1.0f32, 6.0] {
        let pyramid = Arc::new(synthetic_pyramid(
            minutes * 60.0,
            44100,
            128.0,
            3,
            &BuildConfig::default(),
        ));
        let mut resources = match WaveformResources::new(&ctx, SamplerFilter::Linear) {
            Ok(resources) => resources,
            Err(_) => continue,
        };
        group.bench_with_input(
            BenchmarkId::new("upload", format!("{}min", minutes)),
            &pyramid,
            |b, pyramid| {
                b.iter(|| {
                    resources.upload(pyramid.clone()).ok();
                    let _ = ctx.device.poll(wgpu::PollType::wait_indefinitely());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_frame, bench_zoom_rebind, bench_upload);
criterion_main!(benches);

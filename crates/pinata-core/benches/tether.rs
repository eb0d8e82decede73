use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use pinata_core::{Camera, FrameHandle, Pose, TetherConfig, TetherRenderer, tether_points};

fn bench_tether_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("tether_points");
    for segments in [15usize, 64, 256] {
        let config = TetherConfig {
            segments,
            ..TetherConfig::default()
        };
        let mut out = Vec::with_capacity(segments);
        group.bench_with_input(BenchmarkId::from_parameter(segments), &config, |b, config| {
            b.iter(|| {
                tether_points(
                    black_box(Vec3::new(0.0, 2.3, 0.0)),
                    black_box(Vec3::new(0.4, 1.1, -0.2)),
                    config,
                    &mut out,
                )
            })
        });
    }
    group.finish();
}

fn bench_renderer_update(c: &mut Criterion) {
    let root = FrameHandle::root("pinata", Pose::from_position(Vec3::Y * 1.8));
    let anchor = root.child("anchor", Pose::from_position(Vec3::Y * 0.5));
    let mut renderer = TetherRenderer::new(TetherConfig::default());
    renderer.bind(anchor, root.clone());
    let viewer = Camera::looking_at(
        Vec3::new(0.0, 1.5, 2.0),
        Vec3::new(0.0, 2.0, 0.0),
        60.0,
        Vec2::new(1170.0, 2532.0),
    );

    c.bench_function("renderer_update", |b| {
        b.iter(|| {
            root.translate_world(Vec3::X * 1e-4);
            renderer.update(black_box(&viewer)).map(|p| p.len())
        })
    });
}

criterion_group!(benches, bench_tether_points, bench_renderer_update);
criterion_main!(benches);

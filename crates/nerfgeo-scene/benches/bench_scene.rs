use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;
use nerfgeo_lie::Pose;
use nerfgeo_scene::{
    estimate_center_radius, normalize, spherify, view_matrix, CenterRadiusParams, RenderOptions,
};
use rand::Rng;

fn random_ring(n: usize) -> Vec<Pose> {
    let mut rng = rand::rng();
    (0..n)
        .filter_map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            let position = DVec3::new(
                4.0 * t.cos() + rng.random_range(-0.1..0.1),
                1.0 + rng.random_range(-0.1..0.1),
                4.0 * t.sin() + rng.random_range(-0.1..0.1),
            );
            view_matrix(position, DVec3::Y, position).ok()
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for num_poses in [32, 256, 2048] {
        let poses = random_ring(num_poses);
        let bounds = vec![[0.1, 10.0]; num_poses];

        group.bench_with_input(BenchmarkId::new("recenter", num_poses), &poses, |b, poses| {
            b.iter(|| std::hint::black_box(normalize::recenter(std::hint::black_box(poses))))
        });

        group.bench_with_input(BenchmarkId::new("rerotate", num_poses), &poses, |b, poses| {
            b.iter(|| std::hint::black_box(normalize::rerotate(std::hint::black_box(poses))))
        });

        group.bench_with_input(BenchmarkId::new("spherify", num_poses), &poses, |b, poses| {
            b.iter(|| std::hint::black_box(spherify(std::hint::black_box(poses), &bounds, &[])))
        });
    }

    group.finish();
}

fn bench_center_radius(c: &mut Criterion) {
    let mut group = c.benchmark_group("center_radius");
    group.sample_size(10);

    let oracle = |points: &[DVec3]| {
        points
            .iter()
            .map(|p| (-(p.distance_squared(DVec3::new(0.2, 0.0, 0.0))) * 20.0).exp())
            .collect::<Vec<_>>()
    };
    let options = RenderOptions::default();

    for resolution in [16, 32, 64] {
        let params = CenterRadiusParams {
            resolution,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("estimate", resolution), &params, |b, params| {
            b.iter(|| std::hint::black_box(estimate_center_radius(&oracle, params, &options)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_center_radius);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;
use nerfgeo_lie::{pose, se3, so3, Pose, Se3Vector, SeriesConfig};
use rand::Rng;

fn random_vectors(n: usize, scale: f64) -> Vec<DVec3> {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| {
            DVec3::new(
                rng.random_range(-scale..scale),
                rng.random_range(-scale..scale),
                rng.random_range(-scale..scale),
            )
        })
        .collect()
}

fn bench_so3(c: &mut Criterion) {
    let mut group = c.benchmark_group("so3");

    let omegas = random_vectors(1000, 1.0);
    let rotations: Vec<_> = omegas.iter().map(|&w| so3::exp(w)).collect();

    for order in [4, 10, 16] {
        let config = SeriesConfig {
            order,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("exp", order), &config, |b, config| {
            b.iter(|| {
                for omega in omegas.iter() {
                    std::hint::black_box(so3::exp_with(std::hint::black_box(*omega), config));
                }
            })
        });
    }

    group.bench_function(BenchmarkId::new("log", ""), |b| {
        b.iter(|| {
            for rotation in rotations.iter() {
                std::hint::black_box(so3::log(std::hint::black_box(rotation)));
            }
        })
    });

    group.finish();
}

fn bench_se3(c: &mut Criterion) {
    let mut group = c.benchmark_group("se3");

    let tangents: Vec<_> = random_vectors(1000, 1.0)
        .into_iter()
        .zip(random_vectors(1000, 10.0))
        .map(|(w, u)| Se3Vector::new(w, u))
        .collect();
    let poses: Vec<Pose> = tangents.iter().map(|&v| se3::exp(v)).collect();

    group.bench_function(BenchmarkId::new("exp", ""), |b| {
        b.iter(|| {
            for v in tangents.iter() {
                std::hint::black_box(se3::exp(std::hint::black_box(*v)));
            }
        })
    });

    group.bench_function(BenchmarkId::new("log", ""), |b| {
        b.iter(|| {
            for p in poses.iter() {
                std::hint::black_box(se3::log(std::hint::black_box(p)));
            }
        })
    });

    group.bench_function(BenchmarkId::new("compose", poses.len()), |b| {
        b.iter(|| std::hint::black_box(pose::compose(std::hint::black_box(&poses))))
    });

    group.finish();
}

criterion_group!(benches, bench_so3, bench_se3);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shadowflight_execution::flight::{compute_flight, next_multiplier, FlightParams};
use shadowflight_execution::rtp::survival;
use shadowflight_execution::{sample_crash_point, GameRng};
use shadowflight_types::{CRASH_POINT_MAX, DIFFICULTY_MAX, DIFFICULTY_MIN, DRAIN_EXPONENT};

fn crash_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("crash_sampler");
    for difficulty in [DIFFICULTY_MIN, 1.0, DIFFICULTY_MAX] {
        group.bench_function(BenchmarkId::new("normal", difficulty), |b| {
            let mut rng = GameRng::from_seed(1);
            b.iter(|| black_box(sample_crash_point(&mut rng, false, black_box(difficulty))))
        });

        group.bench_function(BenchmarkId::new("survival", difficulty), |b| {
            b.iter(|| black_box(survival(black_box(2.0), difficulty)))
        });
    }

    group.bench_function("safe_zone", |b| {
        let mut rng = GameRng::from_seed(2);
        b.iter(|| black_box(sample_crash_point(&mut rng, true, 1.0)))
    });
    group.finish();
}

fn flight_tick(c: &mut Criterion) {
    let params = FlightParams {
        crash_multiplier: 12.0,
        is_safe_zone: false,
        difficulty: 1.0,
        drain_exponent: DRAIN_EXPONENT,
        crash_point_max: CRASH_POINT_MAX,
    };
    c.bench_function("flight_tick", |b| {
        b.iter(|| {
            let multiplier = next_multiplier(black_box(3.2), 0.02);
            black_box(compute_flight(multiplier, &params))
        })
    });
}

criterion_group!(benches, crash_sampler, flight_tick);
criterion_main!(benches);

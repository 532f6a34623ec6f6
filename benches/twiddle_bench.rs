use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use twiddle_pid::config::SessionConfig;
use twiddle_pid::control::{twiddle::Twiddle, PID_STARTUP};
use twiddle_pid::session::driver::DrivingSession;

fn twiddle_step_bench(c: &mut Criterion) {
    c.bench_function("twiddle_100_steps", |b| {
        b.iter(|| {
            let mut t = Twiddle::new();
            for i in 0..100u32 {
                // alternating better/worse scores walk through every transition
                let score = if i % 3 == 0 { -(i as f64) } else { 1000.0 };
                black_box(t.step(score, PID_STARTUP + 1));
            }
            black_box(t.gains())
        })
    });
}

fn episode_bench(c: &mut Criterion) {
    let cfg = SessionConfig {
        max_steps: 2_000,
        ..SessionConfig::default()
    };
    let mut session = DrivingSession::new(cfg);

    c.bench_function("driving_episode", |b| {
        b.iter(|| black_box(session.run_episode().score))
    });
}

criterion_group!(benches, twiddle_step_bench, episode_bench);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use twiddle_pid::control::{pid::Pid, presets, twiddle::TunedPid};
use twiddle_pid::session::episode::{steering_command, throttle_command};

fn pid_update_bench(c: &mut Criterion) {
    let mut pid = Pid::new(0.158161, 0.000489072, 1.69977);
    let mut cte = 0.0f64;

    c.bench_function("pid_update_and_guess", |b| {
        b.iter(|| {
            cte = (cte + 0.01) % 3.0;
            pid.update_error(black_box(cte));
            black_box(pid.guess())
        })
    });
}

fn control_cycle_bench(c: &mut Criterion) {
    let mut steering = TunedPid::from_preset(&presets::STEERING);
    let mut throttle = TunedPid::from_preset(&presets::THROTTLE);

    c.bench_function("steering_throttle_cycle", |b| {
        b.iter(|| {
            let cte = black_box(0.42);
            steering.update_error(cte);
            throttle.update_error(cte);
            black_box((
                steering_command(steering.guess()),
                throttle_command(throttle.guess()),
            ))
        })
    });
}

criterion_group!(benches, pid_update_bench, control_cycle_bench);
criterion_main!(benches);

//! # Twiddle PID Tuning Entry Point
//!
//! Drives a simulated car around a curving track with two PID controllers
//! (steering and throttle), both fed the cross-track error, and tunes their
//! gains between episodes with the Twiddle search.
//!
//! ## Modes
//! - **Tune steering:** Twiddle on the steering gains, throttle fixed.
//! - **Tune both:** Twiddle on steering and throttle, same episode score.
//! - **Fixed gains:** Drive with the recorded presets, no tuning.
//! - **Seed sweep:** Independent sessions on separate threads, one per track seed.
//!
//! ## Outputs (under `TWIDDLE_OUTPUT_DIR`, default `data/tuning`)
//! - `episodes_<mode>.csv`, `session_config_<mode>.csv`, `tuning_<mode>.svg`
//! - `tuning_summary.csv`: one appended row per session.
//!
//! Logging via `RUST_LOG` (e.g. `RUST_LOG=debug` for every Twiddle transition).

use std::io::{stdin, stdout, Write};

use log::{error, info};

use twiddle_pid::{
    config::SessionConfig,
    session::{driver::DrivingSession, parallel::run_parallel_sessions},
    utils::{
        export::{export_summary_csv, run_exports},
        metrics::{shared_metrics, SharedTuningMetrics},
    },
};

const SWEEP_SEEDS: &[u64] = &[1, 2, 3, 4];

fn main() {
    env_logger::init();
    info!("=== TWIDDLE PID START ===");

    let base = SessionConfig::from_env();
    if let Err(e) = base.validate() {
        error!("Invalid configuration: {}", e);
        return;
    }

    loop {
        let choice = prompt_menu();
        match choice.as_str() {
            "1" | "" => {
                let cfg = SessionConfig {
                    episodes: prompt_episodes(base.episodes),
                    tune_steering: true,
                    tune_throttle: false,
                    ..base.clone()
                };
                run_single("steering", cfg);
            }
            "2" => {
                let cfg = SessionConfig {
                    episodes: prompt_episodes(base.episodes),
                    tune_steering: true,
                    tune_throttle: true,
                    ..base.clone()
                };
                run_single("steering_throttle", cfg);
            }
            "3" => {
                let cfg = SessionConfig {
                    episodes: prompt_episodes(base.episodes),
                    tune_steering: false,
                    tune_throttle: false,
                    use_presets: true,
                    ..base.clone()
                };
                run_single("fixed", cfg);
            }
            "4" => {
                println!("Running seed sweep over {:?}", SWEEP_SEEDS);
                run_sweep(&base, SWEEP_SEEDS);
            }
            "5" => {
                println!("Exiting. Goodbye!");
                info!("=== TWIDDLE PID FINISHED ===");
                return;
            }
            other => {
                println!("Unrecognized option '{}', please try again.", other);
            }
        }
    }
}

fn prompt_menu() -> String {
    println!("\n┌─────────────────────────────────────────────┐");
    println!("│     SELECT TUNING MODE                      │");
    println!("├─────────────────────────────────────────────┤");
    println!("│  1) Tune steering                           │");
    println!("│  2) Tune steering + throttle                │");
    println!("│  3) Fixed preset gains (no tuning)          │");
    println!("│  4) Parallel seed sweep                     │");
    println!("│  5) Exit                                    │");
    println!("└─────────────────────────────────────────────┘");
    print!("Select [1/2/3/4/5] (default: 1): ");
    let _ = stdout().flush();

    let mut input = String::new();
    let _ = stdin().read_line(&mut input);
    input.trim().to_string()
}

fn prompt_episodes(default: usize) -> usize {
    print!("Number of episodes [default: {}]: ", default);
    let _ = stdout().flush();
    let mut input = String::new();
    let _ = stdin().read_line(&mut input);
    match input.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => default,
    }
}

fn run_single(label: &str, cfg: SessionConfig) {
    info!(
        "[Session] {}: {} episodes, seed {}, presets {}",
        label, cfg.episodes, cfg.seed, cfg.use_presets
    );

    let metrics: SharedTuningMetrics = shared_metrics();
    let mut session = DrivingSession::new(cfg.clone());

    let mut reports = Vec::with_capacity(cfg.episodes);
    for _ in 0..cfg.episodes {
        let report = session.run_episode();
        metrics.lock().record_episode(&report);
        reports.push(report);
    }

    {
        let m = metrics.lock();
        info!(
            "[Session] {} done: best score {:?}, steering {:?}, throttle {:?}",
            label, m.best_score, m.best_steering, m.best_throttle
        );
    }
    let twiddle = session.steering().twiddle();
    info!(
        "[Session] steering search: p={:?} dp={:?} index={}",
        twiddle.gain_vector(),
        twiddle.step_vector(),
        twiddle.active_index()
    );

    run_exports(&cfg.output_dir, label, &cfg, &reports, &metrics);
}

fn run_sweep(base: &SessionConfig, seeds: &[u64]) {
    let configs: Vec<SessionConfig> = seeds
        .iter()
        .map(|&seed| SessionConfig {
            seed,
            ..base.clone()
        })
        .collect();

    let metrics = shared_metrics();
    match run_parallel_sessions(configs, &metrics) {
        Ok(summaries) => {
            for s in &summaries {
                println!(
                    "seed {:>3}: best score {:>10.2}  steering {:?}  throttle {:?}",
                    s.seed,
                    s.best_score.unwrap_or(f64::NAN),
                    s.best_steering,
                    s.best_throttle
                );
                println!(
                    "          next trial  steering {:?}  throttle {:?}",
                    s.next_steering, s.next_throttle
                );
            }
            {
                let m = metrics.lock();
                info!(
                    "[Sweep] {} episodes over {} sessions, overall best {:?}",
                    m.episodes,
                    summaries.len(),
                    m.best_score
                );
            }
            let summary_path = base.output_dir.join("tuning_summary.csv");
            if let Err(e) = export_summary_csv(&summary_path, "sweep", &metrics) {
                error!("Failed to export sweep summary: {}", e);
            }
        }
        Err(e) => error!("[Sweep] failed: {}", e),
    }
}

//! parallel.rs
//! Independent tuning sessions on their own threads.
//!
//! Every worker owns its controllers, search and track outright; nothing is
//! shared between sessions. Progress flows back over a bounded channel and is
//! folded into the shared metrics by the calling thread only.

use crossbeam::channel::{bounded, Sender};
use log::{debug, info, warn};
use std::thread;

use crate::config::SessionConfig;
use crate::control::gains::Gains;
use crate::session::{driver::DrivingSession, episode::EpisodeReport};
use crate::utils::metrics::SharedTuningMetrics;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum SessionMessage {
    Episode { session: usize, report: EpisodeReport },
    Finished { summary: SessionSummary },
}

/// Outcome of one complete session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session: usize,
    pub seed: u64,
    pub episodes: usize,
    pub best_score: Option<f64>,
    pub best_steering: Option<Gains>,
    pub best_throttle: Option<Gains>,
    /// Gains the search would try next.
    pub next_steering: Gains,
    pub next_throttle: Gains,
}

impl SessionSummary {
    fn new(session: usize, seed: u64) -> Self {
        Self {
            session,
            seed,
            episodes: 0,
            best_score: None,
            best_steering: None,
            best_throttle: None,
            next_steering: Gains::default(),
            next_throttle: Gains::default(),
        }
    }

    fn observe(&mut self, report: &EpisodeReport) {
        self.episodes += 1;
        if self.best_score.is_none_or(|best| report.score < best) {
            self.best_score = Some(report.score);
            self.best_steering = Some(report.steering_gains);
            self.best_throttle = Some(report.throttle_gains);
        }
    }
}

/// Run every config as its own session, concurrently. Summaries come back in config order.
pub fn run_parallel_sessions(
    configs: Vec<SessionConfig>,
    metrics: &SharedTuningMetrics,
) -> Result<Vec<SessionSummary>, String> {
    for (id, cfg) in configs.iter().enumerate() {
        cfg.validate().map_err(|e| format!("session {}: {}", id, e))?;
    }

    let (tx, rx) = bounded::<SessionMessage>(CHANNEL_CAPACITY);
    let mut handles = Vec::with_capacity(configs.len());

    for (id, cfg) in configs.into_iter().enumerate() {
        let tx = tx.clone();
        let handle = thread::Builder::new()
            .name(format!("twiddle_session_{}", id))
            .spawn(move || run_session_worker(id, cfg, tx))
            .map_err(|e| format!("failed to spawn session {}: {}", id, e))?;
        handles.push(handle);
    }
    // Only workers hold senders now; recv() ends once they all finish.
    drop(tx);

    let mut summaries = Vec::with_capacity(handles.len());
    while let Ok(msg) = rx.recv() {
        match msg {
            SessionMessage::Episode { session, report } => {
                debug!(
                    "[session {}] episode {} score={:.2}",
                    session, report.episode, report.score
                );
                metrics.lock().record_episode(&report);
            }
            SessionMessage::Finished { summary } => {
                info!(
                    "[session {}] finished {} episodes, best score {:?}",
                    summary.session, summary.episodes, summary.best_score
                );
                summaries.push(summary);
            }
        }
    }

    for (id, handle) in handles.into_iter().enumerate() {
        if handle.join().is_err() {
            return Err(format!("session {} panicked", id));
        }
    }

    summaries.sort_by_key(|s| s.session);
    Ok(summaries)
}

fn run_session_worker(id: usize, cfg: SessionConfig, tx: Sender<SessionMessage>) {
    let episodes = cfg.episodes;
    let mut summary = SessionSummary::new(id, cfg.seed);
    let mut session = DrivingSession::new(cfg);

    for _ in 0..episodes {
        let report = session.run_episode();
        summary.observe(&report);
        if tx.send(SessionMessage::Episode { session: id, report }).is_err() {
            warn!("[session {}] collector gone, stopping early", id);
            return;
        }
    }

    summary.next_steering = session.steering().pid().gains();
    summary.next_throttle = session.throttle().pid().gains();
    if tx.send(SessionMessage::Finished { summary }).is_err() {
        warn!("[session {}] collector gone, summary dropped", id);
    }
}

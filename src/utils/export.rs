//! CSV export of a tuning session.
//!
//! - `episodes_<label>.csv`: one row per episode (score, gains used, search transitions).
//! - `session_config_<label>.csv`: the configuration the session ran with.
//! - `tuning_summary.csv`: one appended row per session, for comparing runs.
//! - `tuning_<label>.svg`: score and steering gain trajectories.

use std::{
    error::Error,
    fs::{create_dir_all, OpenOptions},
    path::Path,
};

use csv::{Writer, WriterBuilder};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::control::twiddle::StepOutcome;
use crate::session::episode::EpisodeReport;
use crate::utils::{
    charts::render_tuning_chart,
    metrics::{calculate_stats, calculate_stats_u64, SharedTuningMetrics},
};

/// Flat CSV row for one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub steps: u64,
    pub total_error: f64,
    pub max_speed: f64,
    pub score: f64,
    pub steer_kp: f64,
    pub steer_ki: f64,
    pub steer_kd: f64,
    pub throttle_kp: f64,
    pub throttle_ki: f64,
    pub throttle_kd: f64,
    pub steering_outcome: String,
    pub throttle_outcome: String,
}

impl From<&EpisodeReport> for EpisodeRecord {
    fn from(r: &EpisodeReport) -> Self {
        Self {
            episode: r.episode,
            steps: r.steps,
            total_error: r.total_error,
            max_speed: r.max_speed,
            score: r.score,
            steer_kp: r.steering_gains.kp,
            steer_ki: r.steering_gains.ki,
            steer_kd: r.steering_gains.kd,
            throttle_kp: r.throttle_gains.kp,
            throttle_ki: r.throttle_gains.ki,
            throttle_kd: r.throttle_gains.kd,
            steering_outcome: outcome_label(r.steering_outcome),
            throttle_outcome: outcome_label(r.throttle_outcome),
        }
    }
}

pub fn outcome_label(outcome: Option<StepOutcome>) -> String {
    match outcome {
        None => String::new(),
        Some(StepOutcome::Seeded) => "seeded".into(),
        Some(StepOutcome::Improved) => "improved".into(),
        Some(StepOutcome::Reversed) => "reversed".into(),
        Some(StepOutcome::Refined) => "refined".into(),
        Some(StepOutcome::Advanced {
            index,
            improved: false,
        }) => format!("advanced:{}", index),
        Some(StepOutcome::Advanced {
            index,
            improved: true,
        }) => format!("improved+advanced:{}", index),
    }
}

fn ensure_parent(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            create_dir_all(dir)?;
        }
    }
    Ok(())
}

pub fn export_episodes_csv(path: &Path, reports: &[EpisodeReport]) -> Result<(), Box<dyn Error>> {
    ensure_parent(path)?;
    let mut wtr = Writer::from_path(path)?;
    for report in reports {
        wtr.serialize(EpisodeRecord::from(report))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_config_csv(path: &Path, config: &SessionConfig) -> Result<(), Box<dyn Error>> {
    ensure_parent(path)?;
    let mut wtr = Writer::from_path(path)?;
    wtr.serialize(config)?;
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    label: &'a str,
    episodes: u64,
    improvements: u64,
    advances: u64,
    best_score: Option<f64>,
    best_steer_kp: Option<f64>,
    best_steer_ki: Option<f64>,
    best_steer_kd: Option<f64>,
    score_mean: Option<f64>,
    score_std_dev: Option<f64>,
    score_worst: Option<f64>,
    error_mean: Option<f64>,
    steps_mean: Option<f64>,
    steps_min: Option<f64>,
    steps_max: Option<f64>,
    speed_mean: Option<f64>,
    speed_max: Option<f64>,
}

/// Appends one row for this session; header written only when the file is new.
pub fn export_summary_csv(
    path: &Path,
    label: &str,
    metrics: &SharedTuningMetrics,
) -> Result<(), Box<dyn Error>> {
    ensure_parent(path)?;
    let file_exists = path.exists();

    let row = {
        let m = metrics.lock();
        let scores = calculate_stats(&m.scores);
        let errors = calculate_stats(&m.total_errors);
        let steps = calculate_stats_u64(&m.steps);
        let speeds = calculate_stats(&m.max_speeds);
        SummaryRow {
            label,
            episodes: m.episodes,
            improvements: m.improvements,
            advances: m.advances,
            best_score: m.best_score,
            best_steer_kp: m.best_steering.map(|g| g.kp),
            best_steer_ki: m.best_steering.map(|g| g.ki),
            best_steer_kd: m.best_steering.map(|g| g.kd),
            score_mean: scores.as_ref().map(|s| s.mean),
            score_std_dev: scores.as_ref().map(|s| s.std_dev),
            score_worst: scores.as_ref().map(|s| s.max),
            error_mean: errors.as_ref().map(|s| s.mean),
            steps_mean: steps.as_ref().map(|s| s.mean),
            steps_min: steps.as_ref().map(|s| s.min),
            steps_max: steps.as_ref().map(|s| s.max),
            speed_mean: speeds.as_ref().map(|s| s.mean),
            speed_max: speeds.as_ref().map(|s| s.max),
        }
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut wtr = WriterBuilder::new().has_headers(!file_exists).from_writer(file);
    wtr.serialize(&row)?;
    wtr.flush()?;
    Ok(())
}

/// Writes every report for one session under `dir`; failures are logged, not fatal.
pub fn run_exports(
    dir: &Path,
    label: &str,
    config: &SessionConfig,
    reports: &[EpisodeReport],
    metrics: &SharedTuningMetrics,
) {
    let episodes_path = dir.join(format!("episodes_{}.csv", label));
    match export_episodes_csv(&episodes_path, reports) {
        Ok(()) => info!("Episodes exported to {:?}", episodes_path),
        Err(e) => error!("Failed to export episodes: {}", e),
    }

    let config_path = dir.join(format!("session_config_{}.csv", label));
    if let Err(e) = export_config_csv(&config_path, config) {
        error!("Failed to export session config: {}", e);
    }

    let summary_path = dir.join("tuning_summary.csv");
    match export_summary_csv(&summary_path, label, metrics) {
        Ok(()) => info!("Summary appended to {:?}", summary_path),
        Err(e) => error!("Failed to export summary: {}", e),
    }

    let chart_path = dir.join(format!("tuning_{}.svg", label));
    match render_tuning_chart(&chart_path, reports) {
        Ok(()) => info!("Chart rendered to {:?}", chart_path),
        Err(e) => error!("Failed to render chart: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::gains::Gains;
    use crate::utils::metrics::shared_metrics;

    fn report(episode: usize, score: f64) -> EpisodeReport {
        EpisodeReport {
            episode,
            steps: 400 + episode as u64,
            total_error: 0.25,
            max_speed: 21.5,
            score,
            steering_gains: Gains::new(0.2, 0.001, 3.0),
            throttle_gains: Gains::new(-0.3, 0.0, 1.0),
            steering_outcome: Some(StepOutcome::Advanced {
                index: 2,
                improved: false,
            }),
            throttle_outcome: None,
        }
    }

    #[test]
    fn episodes_round_trip_through_csv() {
        let dir = tempfile::tempdir().expect("test: create tempdir");
        let path = dir.path().join("nested").join("episodes.csv");
        let reports = vec![report(0, -400.0), report(1, -420.5)];

        export_episodes_csv(&path, &reports).expect("test: export");

        let mut rdr = csv::Reader::from_path(&path).expect("test: open");
        let rows: Vec<EpisodeRecord> = rdr
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("test: parse rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], EpisodeRecord::from(&reports[1]));
        assert_eq!(rows[0].steering_outcome, "advanced:2");
        assert_eq!(rows[0].throttle_outcome, "");
    }

    #[test]
    fn summary_header_written_once() {
        let dir = tempfile::tempdir().expect("test: create tempdir");
        let path = dir.path().join("summary.csv");
        let metrics = shared_metrics();
        metrics.lock().record_episode(&report(0, -400.0));

        export_summary_csv(&path, "a", &metrics).expect("test: first");
        export_summary_csv(&path, "b", &metrics).expect("test: second");

        let text = std::fs::read_to_string(&path).expect("test: read");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("label,episodes"));
        assert!(lines[1].starts_with("a,1,"));
        assert!(lines[2].starts_with("b,1,"));
    }

    #[test]
    fn summary_carries_search_and_episode_stats() {
        let dir = tempfile::tempdir().expect("test: create tempdir");
        let path = dir.path().join("summary.csv");
        let metrics = shared_metrics();
        let mut improved = report(1, -450.0);
        improved.steering_outcome = Some(StepOutcome::Advanced {
            index: 1,
            improved: true,
        });
        improved.max_speed = 30.0;
        metrics.lock().record_episode(&report(0, -400.0));
        metrics.lock().record_episode(&improved);

        export_summary_csv(&path, "run", &metrics).expect("test: export");

        let mut rdr = csv::Reader::from_path(&path).expect("test: open");
        let headers = rdr.headers().expect("test: headers").clone();
        let row = rdr.records().next().expect("test: one row").expect("test: parse");
        let field = |name: &str| {
            let idx = headers.iter().position(|h| h == name).expect("test: column");
            row[idx].to_string()
        };
        assert_eq!(field("improvements"), "1");
        assert_eq!(field("advances"), "2");
        assert_eq!(field("best_score"), "-450.0");
        assert_eq!(field("score_worst"), "-400.0");
        assert_eq!(field("steps_min"), "400.0");
        assert_eq!(field("steps_max"), "401.0");
        assert_eq!(field("speed_max"), "30.0");
    }

    #[test]
    fn improvement_that_advances_is_labelled() {
        let label = outcome_label(Some(StepOutcome::Advanced {
            index: 0,
            improved: true,
        }));
        assert_eq!(label, "improved+advanced:0");
    }
}

//! SVG chart of a tuning session: episode score on top, steering gains below.

use std::{error::Error, path::Path};

use plotters::{coord::Shift, prelude::*};

use crate::session::episode::EpisodeReport;

pub fn render_tuning_chart(path: &Path, reports: &[EpisodeReport]) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let root = SVGBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(384);

    let scores: Vec<f64> = reports.iter().map(|r| r.score).collect();
    plot_lines(&upper, "Episode score", &[("score", scores.as_slice(), BLUE)])?;

    let kp: Vec<f64> = reports.iter().map(|r| r.steering_gains.kp).collect();
    let ki: Vec<f64> = reports.iter().map(|r| r.steering_gains.ki).collect();
    let kd: Vec<f64> = reports.iter().map(|r| r.steering_gains.kd).collect();
    plot_lines(
        &lower,
        "Steering gains",
        &[
            ("kp", kp.as_slice(), RED),
            ("ki", ki.as_slice(), GREEN),
            ("kd", kd.as_slice(), MAGENTA),
        ],
    )?;

    root.present()?;
    Ok(())
}

/// Line chart over episode index, one line per series.
fn plot_lines(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    series: &[(&str, &[f64], RGBColor)],
) -> Result<(), Box<dyn Error>> {
    let len = series.iter().map(|(_, data, _)| data.len()).max().unwrap_or(0).max(1);
    let (min_y, max_y) = {
        let all = series.iter().flat_map(|(_, data, _)| data.iter().copied());
        let (min, max) = all.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min.is_finite() && max.is_finite() {
            (min, max.max(min + 1e-6))
        } else {
            (0.0, 1.0)
        }
    };

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(20)
        .y_label_area_size(50)
        .build_cartesian_2d(0..len, min_y..max_y)?;
    chart.configure_mesh().disable_mesh().draw()?;

    for &(name, data, color) in series {
        chart
            .draw_series(LineSeries::new(data.iter().enumerate().map(|(i, v)| (i, *v)), &color))?
            .label(name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::gains::Gains;

    #[test]
    fn renders_svg_file() {
        let dir = tempfile::tempdir().expect("test: create tempdir");
        let path = dir.path().join("chart.svg");
        let reports: Vec<EpisodeReport> = (0..5)
            .map(|i| EpisodeReport {
                episode: i,
                steps: 400,
                total_error: 0.1,
                max_speed: 20.0,
                score: -400.0 - i as f64,
                steering_gains: Gains::new(0.1 * i as f64, 0.0, 1.0),
                throttle_gains: Gains::default(),
                steering_outcome: None,
                throttle_outcome: None,
            })
            .collect();

        render_tuning_chart(&path, &reports).expect("test: render");
        let svg = std::fs::read_to_string(&path).expect("test: read");
        assert!(svg.contains("<svg"));
    }
}

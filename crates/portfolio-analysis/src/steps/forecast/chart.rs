//! SVG forecast charts

use crate::error::{AnalysisError, Result};
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::fmt::Display;
use std::path::Path;

pub const CHART_SIZE: (u32, u32) = (1000, 600);

fn chart_error(e: impl Display) -> AnalysisError {
    AnalysisError::ChartError(e.to_string())
}

/// Draw history (black) and forecast (thicker red) into an SVG at `path`
///
/// The x axis counts days from the first plotted date and is labelled with
/// calendar months.
pub fn render_forecast_chart(
    path: &Path,
    title: &str,
    history: &[(NaiveDate, f64)],
    forecast: &[(NaiveDate, f64)],
) -> Result<()> {
    let origin = history
        .first()
        .or(forecast.first())
        .map(|(d, _)| *d)
        .ok_or_else(|| AnalysisError::ChartError("nothing to plot".into()))?;
    let to_x = move |d: &NaiveDate| (*d - origin).num_days();

    let x_max = history
        .iter()
        .chain(forecast)
        .map(|(d, _)| to_x(d))
        .max()
        .unwrap_or(0)
        .max(1);

    let (lo, hi) = history
        .iter()
        .chain(forecast)
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return Err(AnalysisError::ChartError("no finite values to plot".into()));
    }
    let pad = if hi > lo {
        (hi - lo) * 0.05
    } else {
        hi.abs() * 0.05 + 1.0
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0_i64..x_max, (lo - pad)..(hi + pad))
        .map_err(chart_error)?;

    let month_label = move |x: &i64| (origin + Duration::days(*x)).format("%Y-%m").to_string();
    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .x_label_formatter(&month_label)
        .x_desc("Date")
        .y_desc("Price")
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(LineSeries::new(
            history.iter().map(|(d, v)| (to_x(d), *v)),
            &BLACK,
        ))
        .map_err(chart_error)?
        .label("History")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));

    chart
        .draw_series(LineSeries::new(
            forecast.iter().map(|(d, v)| (to_x(d), *v)),
            RED.stroke_width(2),
        ))
        .map_err(chart_error)?
        .label("Forecast")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(start: NaiveDate, values: &[f64]) -> Vec<(NaiveDate, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("AAA_forecast.svg");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let history = points(start, &[10.0, 11.0, 12.0]);
        let forecast = points(start + Duration::days(3), &[12.5, 13.0]);

        render_forecast_chart(&path, "AAA - 2 Day Forecast", &history, &forecast).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("AAA - 2 Day Forecast"));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.svg");
        assert!(matches!(
            render_forecast_chart(&path, "x", &[], &[]),
            Err(AnalysisError::ChartError(_))
        ));
    }
}

//! Text rendering for results, state tables and reports

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use portfolio_analysis::steps::Ranking;
use portfolio_core::{AnalysisState, PipelineResult, StepRecord, StepStatus};
use portfolio_utils::AppConfig;
use std::path::{Path, PathBuf};

/// Step results longer than this are cut in the step log
pub const STEP_PREVIEW_CHARS: usize = 500;

/// First 500 characters, with `...` when anything was cut
pub fn truncate(text: &str) -> String {
    let mut chars = text.chars();
    let mut out: String = chars.by_ref().take(STEP_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

fn step_line(record: &StepRecord) -> String {
    let icon = match record.status {
        StepStatus::Succeeded => "🔹",
        StepStatus::Failed => "🔸",
    };
    format!("{icon} {}\n{}", record.step, truncate(&record.result))
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            header
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

/// Summary, charts and step log for one run
pub fn render_result(result: &PipelineResult, charts: &[PathBuf]) -> String {
    let mut out = String::new();

    out.push_str("📝 Executive Summary\n");
    out.push_str(&"─".repeat(60));
    out.push('\n');
    if result.final_response.trim().is_empty() {
        out.push_str("No response generated.\n");
    } else {
        out.push_str(result.final_response.trim_end());
        out.push('\n');
    }

    out.push_str("\n📈 Technical Forecasts\n");
    if charts.is_empty() {
        out.push_str("No charts generated. This usually means the data fetch failed.\n");
    }
    for chart in charts {
        out.push_str(&format!("  {}\n", chart.display()));
    }

    out.push_str(&format!("\n🔍 Step Log (run {}, {} mode)\n", result.run_id, result.mode));
    for record in &result.steps {
        out.push_str(&step_line(record));
        out.push('\n');
    }
    out
}

/// Per-ticker view of everything the run computed
pub fn state_table(state: &AnalysisState) -> Table {
    let mut t = table(&[
        "Ticker",
        "Points",
        "Last Close",
        "Sharpe",
        "Beta",
        "VaR 95%",
        "Volatility",
        "Forecast",
        "Sentiment",
    ]);

    for (ticker, series) in state.portfolio.iter() {
        let risk = state.risk_metrics.get(ticker);
        let forecast = state.forecasts.get(ticker);
        let sentiment = state.sentiment.get(ticker);
        let na = || "-".to_string();

        t.add_row(vec![
            Cell::new(ticker.as_str()),
            Cell::new(series.len()),
            Cell::new(series.last_close().map_or_else(na, |c| format!("{c:.2}"))),
            Cell::new(risk.map_or_else(na, |r| format!("{:.2}", r.sharpe))),
            Cell::new(risk.map_or_else(na, |r| format!("{:.2}", r.beta))),
            Cell::new(risk.map_or_else(na, |r| format!("{:.2}%", r.var_95 * 100.0))),
            Cell::new(risk.map_or_else(na, |r| format!("{:.2}%", r.volatility * 100.0))),
            forecast.map_or_else(
                || Cell::new("-"),
                |f| {
                    Cell::new(format!("{:+.2}% ({}d)", f.change_pct, f.horizon_days)).fg(
                        if f.change_pct >= 0.0 {
                            Color::Green
                        } else {
                            Color::Red
                        },
                    )
                },
            ),
            Cell::new(sentiment.map_or_else(na, |s| format!("{} ({:.2})", s.label, s.score))),
        ]);
    }
    t
}

pub fn ranking_table(ranking: &Ranking) -> Table {
    let mut t = table(&["Rank", "Ticker", "Score"]);
    for (i, (ticker, score)) in ranking.entries.iter().enumerate() {
        t.add_row(vec![
            Cell::new(i + 1),
            Cell::new(ticker.as_str()),
            Cell::new(format!("{score:.2}")),
        ]);
    }
    t
}

fn status_cell(ok: bool, good: &str, bad: &str) -> Cell {
    if ok {
        Cell::new(format!("✅ {good}")).fg(Color::Green)
    } else {
        Cell::new(format!("❌ {bad}")).fg(Color::Red)
    }
}

/// Credential status and effective settings
pub fn status_table(config: &AppConfig) -> Table {
    let mut t = table(&["Setting", "Value"]);

    t.add_row(vec![
        Cell::new("Gemini AI"),
        status_cell(config.has_llm_credentials(), "Connected", "Disconnected (GOOGLE_API_KEY)"),
    ]);
    let news = if config.news_api_key.is_some() {
        Cell::new("✅ Connected").fg(Color::Green)
    } else {
        Cell::new("⚠️ Missing Key").fg(Color::Yellow)
    };
    t.add_row(vec![Cell::new("News API"), news]);

    let rows = [
        ("Model", config.llm_model.clone()),
        ("Temperature", config.temperature.to_string()),
        ("Sentiment", config.enable_sentiment.to_string()),
        ("LLM Orchestration", config.enable_llm_orchestration.to_string()),
        ("Default Period", config.default_period.clone()),
        ("Forecast Days", config.default_forecast_days.to_string()),
        ("LLM Calls / Minute", config.max_api_calls_per_minute.to_string()),
        ("Assets Dir", config.assets_dir.display().to_string()),
    ];
    for (name, value) in rows {
        t.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    t
}

/// Write `portfolio_report_{unix_seconds}.md` into `dir`
pub fn write_report(dir: &Path, text: &str, unix_seconds: i64) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("portfolio_report_{unix_seconds}.md"));
    std::fs::write(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{ExecutionMode, PriceBar, PriceSeries, RiskMetrics, Ticker};

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn result(steps: Vec<StepRecord>, final_response: &str) -> PipelineResult {
        PipelineResult {
            run_id: uuid::Uuid::nil(),
            mode: ExecutionMode::Manual,
            steps,
            final_response: final_response.to_string(),
            data_state: AnalysisState::new(),
            synthesis_mode: None,
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let exact = "é".repeat(STEP_PREVIEW_CHARS);
        assert_eq!(truncate(&exact), exact);
        let long = "a".repeat(STEP_PREVIEW_CHARS + 1);
        let cut = truncate(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), STEP_PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_render_result() {
        let long = "x".repeat(800);
        let out = render_result(
            &result(
                vec![
                    StepRecord::succeeded("Fetching Data", "✅ AAA: 252 data points"),
                    StepRecord::failed("Risk Analysis", long.clone()),
                ],
                "🏆 PORTFOLIO RANKING:\n1. AAA (Score: 1.00)",
            ),
            &[PathBuf::from("assets/AAA_forecast.svg")],
        );

        assert!(out.contains("1. AAA (Score: 1.00)"));
        assert!(out.contains("  assets/AAA_forecast.svg"));
        assert!(out.contains("🔹 Fetching Data\n✅ AAA: 252 data points"));
        assert!(out.contains("🔸 Risk Analysis"));
        assert!(!out.contains(&long));
        assert!(out.contains("manual mode"));
    }

    #[test]
    fn test_render_empty_result() {
        let out = render_result(&result(vec![], ""), &[]);
        assert!(out.contains("No response generated."));
        assert!(out.contains("No charts generated."));
    }

    #[test]
    fn test_state_table() {
        let mut state = AnalysisState::new();
        let bar = PriceBar {
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 123.456,
            volume: 10,
        };
        state.portfolio.insert(t("AAA"), PriceSeries::new(vec![bar]));
        state.risk_metrics.insert(
            t("AAA"),
            RiskMetrics {
                sharpe: 1.5,
                beta: 0.9,
                var_95: -0.031,
                volatility: 0.22,
            },
        );

        let rendered = state_table(&state).to_string();
        assert!(rendered.contains("AAA"));
        assert!(rendered.contains("123.46"));
        assert!(rendered.contains("-3.10%"));
        assert!(rendered.contains("22.00%"));
    }

    #[test]
    fn test_ranking_table() {
        let ranking = Ranking {
            entries: vec![(t("BBB"), 2.5), (t("AAA"), -0.25)],
        };
        let rendered = ranking_table(&ranking).to_string();
        let bbb = rendered.find("BBB").unwrap();
        let aaa = rendered.find("AAA").unwrap();
        assert!(bbb < aaa);
        assert!(rendered.contains("-0.25"));
    }

    #[test]
    fn test_status_table_reports_missing_keys() {
        let config = AppConfig::builder().build().unwrap();
        let rendered = status_table(&config).to_string();
        assert!(rendered.contains("Disconnected"));
        assert!(rendered.contains("Missing Key"));
        assert!(rendered.contains("gemini-2.5-flash"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_report(&dir.path().join("reports"), "# Summary", 1_700_000_000).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "portfolio_report_1700000000.md"
        );
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Summary");
    }
}

//! Portfolio ranking by risk-adjusted return and expected change

use portfolio_core::{AnalysisState, StepError, Ticker};
use std::cmp::Ordering;
use std::fmt;

pub const SHARPE_WEIGHT: f64 = 0.5;
pub const FORECAST_WEIGHT: f64 = 0.1;

pub const NO_RISK_METRICS: &str = "❌ Run risk analysis first.";

/// Tickers ordered best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub entries: Vec<(Ticker, f64)>,
}

impl Ranking {
    pub fn top(&self) -> Option<&(Ticker, f64)> {
        self.entries.first()
    }
}

impl fmt::Display for Ranking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("🏆 PORTFOLIO RANKING:")?;
        for (i, (ticker, score)) in self.entries.iter().enumerate() {
            write!(f, "\n{}. {ticker} (Score: {score:.2})", i + 1)?;
        }
        Ok(())
    }
}

/// `0.5 · sharpe + 0.1 · change_pct`, with no forecast counting as zero change
pub fn score(state: &AnalysisState, ticker: &Ticker) -> Option<f64> {
    let metrics = state.risk_metrics.get(ticker)?;
    let change = state.forecasts.get(ticker).map_or(0.0, |f| f.change_pct);
    Some(SHARPE_WEIGHT * metrics.sharpe + FORECAST_WEIGHT * change)
}

// Descending; NaN after every number
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Rank every ticker with risk metrics; ties keep insertion order
pub fn rank_portfolio(state: &AnalysisState) -> Result<Ranking, StepError> {
    if state.risk_metrics.is_empty() {
        return Err(StepError::missing_data(NO_RISK_METRICS));
    }

    let mut entries: Vec<(Ticker, f64)> = state
        .risk_metrics
        .keys()
        .filter_map(|t| score(state, t).map(|s| (t.clone(), s)))
        .collect();
    entries.sort_by(|a, b| descending(a.1, b.1));

    Ok(Ranking { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_core::{ForecastSummary, RiskMetrics};

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    fn metrics(sharpe: f64) -> RiskMetrics {
        RiskMetrics {
            sharpe,
            beta: 1.0,
            var_95: -0.02,
            volatility: 0.2,
        }
    }

    fn forecast(change_pct: f64) -> ForecastSummary {
        ForecastSummary {
            current: 100.0,
            predicted: 100.0 + change_pct,
            change_pct,
            horizon_days: 30,
        }
    }

    #[test]
    fn test_requires_risk_metrics() {
        let err = rank_portfolio(&AnalysisState::new()).unwrap_err();
        assert_eq!(err.message, "❌ Run risk analysis first.");
    }

    #[test]
    fn test_scores_and_order() {
        let mut state = AnalysisState::new();
        state.risk_metrics.insert(t("AAA"), metrics(1.0));
        state.risk_metrics.insert(t("BBB"), metrics(2.0));
        state.risk_metrics.insert(t("CCC"), metrics(0.0));
        state.forecasts.insert(t("AAA"), forecast(20.0));
        state.forecasts.insert(t("CCC"), forecast(-5.0));

        let ranking = rank_portfolio(&state).unwrap();
        let order: Vec<&str> = ranking.entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB", "CCC"]);
        assert!((ranking.entries[0].1 - 2.5).abs() < 1e-12);
        assert!((ranking.entries[1].1 - 1.0).abs() < 1e-12);
        assert!((ranking.entries[2].1 + 0.5).abs() < 1e-12);

        assert_eq!(
            ranking.to_string(),
            "🏆 PORTFOLIO RANKING:\n1. AAA (Score: 2.50)\n2. BBB (Score: 1.00)\n3. CCC (Score: -0.50)"
        );
    }

    #[test]
    fn test_ties_keep_insertion_order_and_nan_last() {
        let mut state = AnalysisState::new();
        state.risk_metrics.insert(t("NAN"), metrics(f64::NAN));
        state.risk_metrics.insert(t("ZZZ"), metrics(1.0));
        state.risk_metrics.insert(t("AAA"), metrics(1.0));

        let ranking = rank_portfolio(&state).unwrap();
        let order: Vec<&str> = ranking.entries.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["ZZZ", "AAA", "NAN"]);
        assert_eq!(ranking.top().map(|(t, _)| t.as_str()), Some("ZZZ"));
    }
}

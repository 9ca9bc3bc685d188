//! Additive trend plus seasonality regression
//!
//! A piecewise-linear trend with hinge changepoints and Fourier seasonal terms,
//! fitted by ridge-regularized least squares. Time is scaled to `[0, 1]` over
//! the history span and prices by their absolute maximum.

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// One Fourier seasonality component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    /// Period in days
    pub period: f64,
    /// Number of sin/cos pairs
    pub order: usize,
}

pub const YEARLY: Seasonality = Seasonality {
    name: "yearly",
    period: 365.25,
    order: 10,
};

pub const WEEKLY: Seasonality = Seasonality {
    name: "weekly",
    period: 7.0,
    order: 3,
};

pub const DAILY: Seasonality = Seasonality {
    name: "daily",
    period: 1.0,
    order: 4,
};

#[derive(Debug, Clone)]
pub struct SeasonalConfig {
    pub n_changepoints: usize,
    /// Fraction of history in which changepoints may be placed
    pub changepoint_range: f64,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub seasonalities: Vec<Seasonality>,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            seasonalities: vec![YEARLY, WEEKLY, DAILY],
        }
    }
}

/// A fitted model, ready to project onto future dates
#[derive(Debug, Clone)]
pub struct SeasonalModel {
    config: SeasonalConfig,
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    coef: DVector<f64>,
}

impl SeasonalModel {
    /// Fit with the default component set
    pub fn fit(dates: &[NaiveDate], closes: &[f64]) -> Result<Self> {
        Self::fit_with(SeasonalConfig::default(), dates, closes)
    }

    pub fn fit_with(config: SeasonalConfig, dates: &[NaiveDate], closes: &[f64]) -> Result<Self> {
        if dates.len() != closes.len() {
            return Err(AnalysisError::ModelError(format!(
                "{} dates for {} prices",
                dates.len(),
                closes.len()
            )));
        }
        let n = closes.len();
        if n < 2 {
            return Err(AnalysisError::ModelError(format!(
                "need at least 2 observations, got {n}"
            )));
        }
        if closes.iter().any(|c| !c.is_finite()) {
            return Err(AnalysisError::ModelError("non-finite price in history".into()));
        }

        let start = dates[0];
        let span_days = (dates[n - 1] - start).num_days() as f64;
        if span_days <= 0.0 {
            return Err(AnalysisError::ModelError("history spans a single day".into()));
        }

        let y_scale = match closes.iter().fold(0.0_f64, |m, c| m.max(c.abs())) {
            m if m > 0.0 => m,
            _ => 1.0,
        };

        let t: Vec<f64> = dates
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();
        let changepoints = place_changepoints(&t, config.n_changepoints, config.changepoint_range);

        let mut model = Self {
            config,
            start,
            span_days,
            y_scale,
            changepoints,
            coef: DVector::zeros(0),
        };

        let width = model.width();
        let mut data = Vec::with_capacity(n * width);
        for date in dates {
            data.extend(model.features(*date));
        }
        let x = DMatrix::from_row_slice(n, width, &data);
        let y = DVector::from_iterator(n, closes.iter().map(|c| c / y_scale));

        let mut a = x.transpose() * &x;
        for (j, penalty) in model.penalties().into_iter().enumerate() {
            a[(j, j)] += penalty;
        }
        let b = x.transpose() * y;

        let chol = a
            .cholesky()
            .ok_or_else(|| AnalysisError::ModelError("singular design matrix".into()))?;
        model.coef = chol.solve(&b);

        if model.coef.iter().any(|c| !c.is_finite()) {
            return Err(AnalysisError::ModelError("fit produced non-finite coefficients".into()));
        }
        Ok(model)
    }

    /// Predicted prices for `dates`
    pub fn predict(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates
            .iter()
            .map(|d| {
                let row = DVector::from_vec(self.features(*d));
                row.dot(&self.coef) * self.y_scale
            })
            .collect()
    }

    /// Changepoint locations on the scaled time axis
    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    fn width(&self) -> usize {
        2 + self.changepoints.len()
            + self
                .config
                .seasonalities
                .iter()
                .map(|s| 2 * s.order)
                .sum::<usize>()
    }

    /// Ridge penalty per column; intercept and slope are free
    fn penalties(&self) -> Vec<f64> {
        let cp = 1.0 / self.config.changepoint_prior_scale.powi(2);
        let seasonal = 1.0 / self.config.seasonality_prior_scale.powi(2);

        let mut out = vec![0.0, 0.0];
        out.extend(std::iter::repeat_n(cp, self.changepoints.len()));
        out.extend(std::iter::repeat_n(seasonal, self.width() - out.len()));
        out
    }

    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let days = (date - self.start).num_days() as f64;
        let t = days / self.span_days;

        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|cp| (t - cp).max(0.0)));
        for s in &self.config.seasonalities {
            for k in 1..=s.order {
                let angle = 2.0 * PI * k as f64 * days / s.period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
        }
        row
    }
}

/// Evenly spaced observation times within the first `range` of history
fn place_changepoints(t: &[f64], requested: usize, range: f64) -> Vec<f64> {
    let hist = ((t.len() as f64) * range).floor() as usize;
    let count = requested.min(hist.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last = (hist - 1) as f64;
    let mut points: Vec<f64> = (1..=count)
        .map(|i| {
            let idx = (last * i as f64 / count as f64).round() as usize;
            t[idx]
        })
        .collect();
    points.dedup();
    points
}

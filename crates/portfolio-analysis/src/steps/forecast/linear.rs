//! Ordinary least squares trend on days since the first observation

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    start: NaiveDate,
    pub intercept: f64,
    /// Price change per calendar day
    pub slope: f64,
}

impl LinearTrend {
    pub fn fit(dates: &[NaiveDate], closes: &[f64]) -> Result<Self> {
        if dates.len() != closes.len() || dates.len() < 2 {
            return Err(AnalysisError::ModelError(format!(
                "linear trend needs at least 2 paired observations, got {} dates and {} prices",
                dates.len(),
                closes.len()
            )));
        }

        let start = dates[0];
        let x: Vec<f64> = dates.iter().map(|d| (*d - start).num_days() as f64).collect();
        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = closes.iter().sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (xi, yi) in x.iter().zip(closes) {
            sxy += (xi - mean_x) * (yi - mean_y);
            sxx += (xi - mean_x).powi(2);
        }
        if sxx == 0.0 {
            return Err(AnalysisError::ModelError("all observations share one date".into()));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(AnalysisError::ModelError("non-finite linear fit".into()));
        }

        Ok(Self {
            start,
            intercept,
            slope,
        })
    }

    pub fn predict(&self, dates: &[NaiveDate]) -> Vec<f64> {
        dates
            .iter()
            .map(|d| self.intercept + self.slope * (*d - self.start).num_days() as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fits_exact_line_over_gaps() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let offsets = [0_i64, 1, 4, 5, 6, 11];
        let dates: Vec<NaiveDate> = offsets.iter().map(|d| start + Duration::days(*d)).collect();
        let closes: Vec<f64> = offsets.iter().map(|d| 10.0 + 2.0 * *d as f64).collect();

        let trend = LinearTrend::fit(&dates, &closes).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 10.0).abs() < 1e-12);

        let next = trend.predict(&[start + Duration::days(20)]);
        assert!((next[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_needs_two_dates() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(LinearTrend::fit(&[d], &[1.0]).is_err());
        assert!(LinearTrend::fit(&[d, d], &[1.0, 2.0]).is_err());
    }
}

//! Daily price bars and normalized price series

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars sorted by date with at most one bar per date
///
/// Construction normalizes provider output: bars with a non-finite close are
/// dropped, the rest are sorted and the first bar seen for a date wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.retain(|b| b.close.is_finite());
        // stable sort keeps provider order within a date
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Simple daily returns `c[t] / c[t-1] - 1`
    pub fn daily_returns(&self) -> Vec<f64> {
        self.bars
            .windows(2)
            .map(|w| w[1].close / w[0].close - 1.0)
            .collect()
    }
}

// State dumps show a summary; the raw bars are too long to be useful there.
impl Serialize for PriceSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("PriceSeries", 4)?;
        s.serialize_field("points", &self.bars.len())?;
        s.serialize_field("first_date", &self.first_date())?;
        s.serialize_field("last_date", &self.last_date())?;
        s.serialize_field("last_close", &self.last_close())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    #[test]
    fn test_normalization() {
        let series = PriceSeries::new(vec![
            bar(3, 12.0),
            bar(1, 10.0),
            bar(2, f64::NAN),
            bar(3, 99.0),
            bar(2, 11.0),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_daily_returns() {
        let series = PriceSeries::new(vec![bar(1, 100.0), bar(2, 110.0), bar(3, 99.0)]);
        let returns = series.daily_returns();
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-12);
        assert!((returns[1] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_summary_serialization() {
        let series = PriceSeries::new(vec![bar(1, 100.0), bar(2, 110.0)]);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["points"], 2);
        assert_eq!(json["first_date"], "2024-01-01");
        assert_eq!(json["last_close"], 110.0);
    }
}

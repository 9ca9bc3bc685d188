//! Ticker symbols and insertion-ordered per-ticker maps

use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A normalized (trimmed, upper-case) ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Normalize and validate a single symbol
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let symbol = raw.as_ref().trim().to_uppercase();
        if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
            return Err(Error::InvalidTicker(raw.as_ref().to_string()));
        }
        Ok(Self(symbol))
    }

    /// Parse a comma-separated list such as `"aapl, msft,,GOOGL"`
    ///
    /// Empty entries are dropped, duplicates keep their first position.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        let mut tickers: Vec<Self> = Vec::new();
        for part in raw.split(',') {
            if part.trim().is_empty() {
                continue;
            }
            let ticker = Self::new(part)?;
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        Ok(tickers)
    }

    /// The symbol as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Ticker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// A small map keyed by ticker that remembers insertion order
///
/// Portfolios hold a handful of symbols, so a vector scan is all that is needed.
/// Re-inserting an existing key replaces the value in place.
#[derive(Debug, Clone)]
pub struct TickerMap<V> {
    entries: Vec<(Ticker, V)>,
}

impl<V> Default for TickerMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> TickerMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the previous value
    pub fn insert(&mut self, ticker: Ticker, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| *k == ticker) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((ticker, value));
                None
            }
        }
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&V> {
        self.entries
            .iter()
            .find(|(k, _)| k == ticker)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, ticker: &Ticker) -> bool {
        self.get(ticker).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &Ticker> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<V: Serialize> Serialize for TickerMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ticker, value) in &self.entries {
            map.serialize_entry(ticker.as_str(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Ticker {
        Ticker::new(s).unwrap()
    }

    #[test]
    fn test_ticker_normalization() {
        assert_eq!(t("  aapl ").as_str(), "AAPL");
        assert_eq!(t("brk-b").to_string(), "BRK-B");
        assert!(Ticker::new("   ").is_err());
        assert!(Ticker::new("AA PL").is_err());
    }

    #[test]
    fn test_parse_list_drops_empty_and_duplicates() {
        let tickers = Ticker::parse_list("aapl, msft,, AAPL ,googl,").unwrap();
        let names: Vec<&str> = tickers.iter().map(Ticker::as_str).collect();
        assert_eq!(names, vec!["AAPL", "MSFT", "GOOGL"]);

        assert!(Ticker::parse_list(" , ,").unwrap().is_empty());
    }

    #[test]
    fn test_map_keeps_insertion_order() {
        let mut map = TickerMap::new();
        map.insert(t("MSFT"), 1);
        map.insert(t("AAPL"), 2);
        map.insert(t("GOOGL"), 3);

        let keys: Vec<&str> = map.keys().map(Ticker::as_str).collect();
        assert_eq!(keys, vec!["MSFT", "AAPL", "GOOGL"]);
    }

    #[test]
    fn test_map_replace_in_place() {
        let mut map = TickerMap::new();
        map.insert(t("MSFT"), 1);
        map.insert(t("AAPL"), 2);
        assert_eq!(map.insert(t("MSFT"), 10), Some(1));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&t("MSFT")), Some(&10));
        assert_eq!(map.keys().next().map(Ticker::as_str), Some("MSFT"));
    }

    #[test]
    fn test_map_serializes_as_object() {
        let mut map = TickerMap::new();
        map.insert(t("AAPL"), 1.5);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"AAPL": 1.5}));
    }
}

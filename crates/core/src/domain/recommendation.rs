use crate::domain::allocation::AssetClass;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub generated_at: DateTime<Utc>,
    pub universes: Vec<UniversePicks>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UniversePicks {
    pub asset_class: AssetClass,
    /// Best first; at most `TOP_N`, fewer when tickers were skipped.
    pub picks: Vec<Pick>,
    pub skipped: Vec<SkippedTicker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    pub rank: u32,
    pub ticker: String,
    pub mean_daily_return: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

impl Recommendations {
    pub fn for_class(&self, asset_class: AssetClass) -> Option<&UniversePicks> {
        self.universes.iter().find(|u| u.asset_class == asset_class)
    }

    pub fn symbols(&self, asset_class: AssetClass) -> Vec<&str> {
        self.for_class(asset_class)
            .map(|u| u.picks.iter().map(|p| p.ticker.as_str()).collect())
            .unwrap_or_default()
    }

    /// True when no universe produced a single pick, e.g. the feed is down.
    pub fn is_empty(&self) -> bool {
        self.universes.iter().all(|u| u.picks.is_empty())
    }

    pub fn skipped_count(&self) -> usize {
        self.universes.iter().map(|u| u.skipped.len()).sum()
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookback {
    #[default]
    OneYear,
}

impl Lookback {
    pub fn range_param(self) -> &'static str {
        match self {
            Self::OneYear => "1y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    /// `None` on days the feed has no adjusted close.
    pub adj_close: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn usable_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.adj_close)
            .filter(|c| c.is_finite())
    }

    /// Day-over-day fractional change over the forward-filled close series.
    ///
    /// A missing or non-finite close repeats the last usable one, so each gap day
    /// contributes a 0.0 change. Days before the first usable close are left out, as
    /// are changes from a previous close that is not positive.
    pub fn daily_returns(&self) -> Vec<f64> {
        let mut returns = Vec::with_capacity(self.points.len().saturating_sub(1));
        let mut last: Option<f64> = None;

        for close in self.points.iter().map(|p| p.adj_close.filter(|c| c.is_finite())) {
            let Some(prev) = last else {
                last = close;
                continue;
            };
            let current = close.unwrap_or(prev);
            if prev > 0.0 {
                returns.push((current - prev) / prev);
            }
            last = Some(current);
        }

        returns
    }

    pub fn return_stats(&self) -> Option<ReturnStats> {
        let returns = self.daily_returns();
        if returns.is_empty() {
            return None;
        }
        Some(ReturnStats {
            mean: returns.iter().sum::<f64>() / returns.len() as f64,
            observations: returns.len(),
        })
    }

    pub fn mean_daily_return(&self) -> Option<f64> {
        self.return_stats().map(|stats| stats.mean)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStats {
    pub mean: f64,
    /// Number of day-over-day changes behind `mean`.
    pub observations: usize,
}

// Wire shape of GET /v8/finance/chart/{symbol}.

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartErrorBody {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
    #[serde(default)]
    pub adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartAdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// Pairs timestamps with adjusted closes, falling back to raw closes when the
    /// adjusted series is absent. Timestamps are interpreted as UTC dates.
    pub fn into_series(self, symbol: &str) -> anyhow::Result<PriceSeries> {
        let closes = match self.indicators.adjclose.into_iter().next() {
            Some(adj) if !adj.adjclose.is_empty() => adj.adjclose,
            _ => self
                .indicators
                .quote
                .into_iter()
                .next()
                .map(|q| q.close)
                .unwrap_or_default(),
        };

        anyhow::ensure!(
            closes.len() == self.timestamp.len(),
            "{symbol}: {} timestamps but {} closes",
            self.timestamp.len(),
            closes.len()
        );

        let mut points = Vec::with_capacity(closes.len());
        for (ts, adj_close) in self.timestamp.into_iter().zip(closes) {
            let date = DateTime::<Utc>::from_timestamp(ts, 0)
                .ok_or_else(|| anyhow::anyhow!("{symbol}: timestamp out of range: {ts}"))?
                .date_naive();
            points.push(PricePoint { date, adj_close });
        }

        Ok(PriceSeries {
            symbol: symbol.to_string(),
            points,
        })
    }
}

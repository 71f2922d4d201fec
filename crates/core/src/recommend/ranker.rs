use crate::domain::allocation::AssetClass;
use crate::domain::recommendation::{Pick, Recommendations, SkippedTicker, UniversePicks};
use crate::domain::universe::{self, TickerUniverse};
use crate::market::{Lookback, MarketDataGateway, PriceSeries};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const TOP_N: usize = 3;

pub struct Ranker {
    gateway: Arc<dyn MarketDataGateway>,
    universes: Vec<TickerUniverse>,
    lookback: Lookback,
}

impl Ranker {
    pub fn new(gateway: Arc<dyn MarketDataGateway>) -> Self {
        Self {
            gateway,
            universes: universe::ALL.to_vec(),
            lookback: Lookback::default(),
        }
    }

    pub fn with_universes(mut self, universes: Vec<TickerUniverse>) -> Self {
        self.universes = universes;
        self
    }

    /// Fetches every ticker concurrently and ranks each universe. Per-ticker failures
    /// are reported in `skipped`; this never fails as a whole.
    pub async fn recommend(&self) -> Recommendations {
        let mut pending = InFlight(Vec::new());
        for (u_idx, u) in self.universes.iter().enumerate() {
            for symbol in u.symbols {
                let gateway = Arc::clone(&self.gateway);
                let lookback = self.lookback;
                let symbol = symbol.to_string();
                let handle = tokio::spawn({
                    let symbol = symbol.clone();
                    async move { gateway.fetch_price_series(&symbol, lookback).await }
                });
                pending.0.push((u_idx, symbol, handle));
            }
        }

        let mut fetched: Vec<Vec<(String, Result<PriceSeries, String>)>> =
            vec![Vec::new(); self.universes.len()];
        for (u_idx, symbol, handle) in pending.0.iter_mut() {
            let result = match handle.await {
                Ok(Ok(series)) => Ok(series),
                Ok(Err(err)) => Err(format!("{err:#}")),
                Err(join_err) => Err(format!("fetch task failed: {join_err}")),
            };
            fetched[*u_idx].push((symbol.clone(), result));
        }

        let universes = self
            .universes
            .iter()
            .zip(fetched)
            .map(|(u, results)| rank_universe(u.asset_class, results))
            .collect();

        Recommendations {
            generated_at: chrono::Utc::now(),
            universes,
        }
    }
}

// Aborts outstanding fetches if `recommend` is dropped mid-flight.
struct InFlight(Vec<(usize, String, JoinHandle<anyhow::Result<PriceSeries>>)>);

impl Drop for InFlight {
    fn drop(&mut self) {
        for (_, _, handle) in &self.0 {
            handle.abort();
        }
    }
}

/// Keeps the `TOP_N` highest mean daily returns, best first. Equal means keep the
/// order in which tickers were supplied.
pub fn rank_universe(
    asset_class: AssetClass,
    results: Vec<(String, Result<PriceSeries, String>)>,
) -> UniversePicks {
    let mut scored: Vec<(String, f64, usize)> = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();

    for (ticker, result) in results {
        match result {
            Ok(series) => match series.return_stats() {
                Some(stats) => scored.push((ticker, stats.mean, stats.observations)),
                None => skipped.push(SkippedTicker {
                    ticker,
                    reason: "no day-over-day change from a usable close".to_string(),
                }),
            },
            Err(reason) => skipped.push(SkippedTicker { ticker, reason }),
        }
    }

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    let picks: Vec<Pick> = scored
        .into_iter()
        .take(TOP_N)
        .enumerate()
        .map(|(i, (ticker, mean_daily_return, observations))| Pick {
            rank: i as u32 + 1,
            ticker,
            mean_daily_return,
            observations,
        })
        .collect();

    for s in &skipped {
        tracing::warn!(%asset_class, ticker = %s.ticker, reason = %s.reason, "ticker excluded from ranking");
    }
    if picks.len() < TOP_N {
        tracing::warn!(%asset_class, picks = picks.len(), "fewer picks than requested");
    }

    UniversePicks {
        asset_class,
        picks,
        skipped,
    }
}

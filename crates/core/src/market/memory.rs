use crate::market::provider::{MarketDataGateway, SymbolUnavailable};
use crate::market::types::{Lookback, PriceSeries};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

/// Serves preloaded series. Symbols without data come back as `SymbolUnavailable`.
#[derive(Debug, Clone, Default)]
pub struct StaticGateway {
    series: HashMap<String, PriceSeries>,
    failing: HashMap<String, String>,
    delay: Option<Duration>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.symbol.clone(), series);
        self
    }

    /// Makes `symbol` fail as a transport error would.
    pub fn with_failure(mut self, symbol: &str, message: &str) -> Self {
        self.failing.insert(symbol.to_string(), message.to_string());
        self
    }

    /// Sleeps before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl MarketDataGateway for StaticGateway {
    fn provider_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_price_series(&self, symbol: &str, _lookback: Lookback) -> Result<PriceSeries> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failing.get(symbol) {
            anyhow::bail!("{message}");
        }

        match self.series.get(symbol) {
            Some(series) => Ok(series.clone()),
            None => Err(SymbolUnavailable {
                symbol: symbol.to_string(),
                status: None,
                detail: "no data loaded".to_string(),
            }
            .into()),
        }
    }
}

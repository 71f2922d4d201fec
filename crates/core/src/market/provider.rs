use crate::config::Settings;
use crate::market::types::{ChartEnvelope, Lookback, PriceSeries};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

const CHART_PATH: &str = "/v8/finance/chart";
const USER_AGENT: &str = concat!("glidepath/", env!("CARGO_PKG_VERSION"));
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[async_trait::async_trait]
pub trait MarketDataGateway: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_price_series(&self, symbol: &str, lookback: Lookback) -> Result<PriceSeries>;
}

/// The feed answered, but not with data for this symbol. Retrying will not help.
#[derive(Debug, Clone)]
pub struct SymbolUnavailable {
    pub symbol: String,
    pub status: Option<StatusCode>,
    pub detail: String,
}

impl fmt::Display for SymbolUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} unavailable (HTTP {status}): {}", self.symbol, self.detail),
            None => write!(f, "{} unavailable: {}", self.symbol, self.detail),
        }
    }
}

impl std::error::Error for SymbolUnavailable {}

#[derive(Debug, Clone)]
pub struct HttpChartGateway {
    http: reqwest::Client,
    base_url: String,
    retries: u32,
    initial_backoff: Duration,
}

impl HttpChartGateway {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.market_data_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: settings.market_data_base_url.clone(),
            retries: settings.market_data_retries.max(1),
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    fn url(&self, symbol: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            CHART_PATH,
            symbol.trim()
        )
    }

    async fn fetch_once(&self, symbol: &str, lookback: Lookback) -> Result<PriceSeries> {
        let res = self
            .http
            .get(self.url(symbol))
            .query(&[
                ("range", lookback.range_param()),
                ("interval", "1d"),
                ("events", "div,split"),
            ])
            .send()
            .await
            .with_context(|| format!("market data request failed for {symbol}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read market data response for {symbol}"))?;

        parse_chart_response(symbol, status, &text)
    }
}

#[async_trait::async_trait]
impl MarketDataGateway for HttpChartGateway {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_price_series(&self, symbol: &str, lookback: Lookback) -> Result<PriceSeries> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(symbol, lookback).await {
                Ok(series) => return Ok(series),
                Err(err) => {
                    if attempt >= self.retries || err.downcast_ref::<SymbolUnavailable>().is_some() {
                        return Err(err);
                    }
                    let delay = backoff(self.initial_backoff, attempt);
                    tracing::warn!(symbol, attempt, backoff = ?delay, error = %err, "price fetch failed; retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Wait before the retry that follows failed attempt `attempt` (1-based): doubles from
/// `initial` and never exceeds `MAX_BACKOFF`.
fn backoff(initial: Duration, attempt: u32) -> Duration {
    let doublings = attempt.saturating_sub(1).min(16);
    initial.saturating_mul(1 << doublings).min(MAX_BACKOFF)
}

fn parse_chart_response(symbol: &str, status: StatusCode, text: &str) -> Result<PriceSeries> {
    let unavailable = |detail: String| SymbolUnavailable {
        symbol: symbol.to_string(),
        status: Some(status).filter(|s| !s.is_success()),
        detail,
    };

    // Rate limiting and server faults are worth another attempt; the rest are not.
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        anyhow::bail!("market data HTTP {status} for {symbol}");
    }

    let envelope = match serde_json::from_str::<ChartEnvelope>(text) {
        Ok(envelope) => envelope,
        Err(err) if status.is_success() => {
            return Err(err).with_context(|| format!("chart response for {symbol} is not valid JSON"));
        }
        Err(_) => return Err(unavailable(truncate(text, 200)).into()),
    };

    if let Some(error) = envelope.chart.error {
        let detail = match error.description {
            Some(desc) => format!("{}: {desc}", error.code),
            None => error.code,
        };
        return Err(unavailable(detail).into());
    }

    if !status.is_success() {
        return Err(unavailable("no chart error body".to_string()).into());
    }

    let result = envelope
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.swap_remove(0)))
        .ok_or_else(|| unavailable("empty chart result".to_string()))?;

    result.into_series(symbol)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, routing::get, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct ScriptedFeed {
        hits: Arc<AtomicUsize>,
        statuses: Arc<Vec<u16>>,
    }

    async fn scripted_chart(State(feed): State<ScriptedFeed>) -> (StatusCode, String) {
        let n = feed.hits.fetch_add(1, Ordering::SeqCst);
        let code = feed.statuses[n.min(feed.statuses.len() - 1)];
        let body = match code {
            200 => json!({
                "chart": {
                    "result": [{
                        "timestamp": [1767600000, 1767686400],
                        "indicators": {"adjclose": [{"adjclose": [50.0, 51.0]}]}
                    }],
                    "error": null
                }
            })
            .to_string(),
            404 => json!({
                "chart": {
                    "result": null,
                    "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
                }
            })
            .to_string(),
            _ => "upstream unavailable".to_string(),
        };
        (StatusCode::from_u16(code).unwrap(), body)
    }

    /// Serves the given statuses in order, repeating the last one.
    async fn spawn_feed(statuses: &[u16], retries: u32) -> (HttpChartGateway, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/v8/finance/chart/:symbol", get(scripted_chart))
            .with_state(ScriptedFeed {
                hits: Arc::clone(&hits),
                statuses: Arc::new(statuses.to_vec()),
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let settings = Settings {
            market_data_base_url: format!("http://{addr}"),
            market_data_retries: retries,
            ..Default::default()
        };
        let gw = HttpChartGateway::from_settings(&settings)
            .unwrap()
            .with_initial_backoff(Duration::from_millis(5));
        (gw, hits)
    }

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let (gw, hits) = spawn_feed(&[503, 200], 3).await;
        let series = gw.fetch_price_series("BND", Lookback::OneYear).await.unwrap();
        assert_eq!(series.symbol, "BND");
        assert!((series.mean_daily_return().unwrap() - 0.02).abs() < 1e-12);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let (gw, hits) = spawn_feed(&[503], 3).await;
        let err = gw.fetch_price_series("BND", Lookback::OneYear).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert!(err.downcast_ref::<SymbolUnavailable>().is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn chart_error_is_requested_once() {
        let (gw, hits) = spawn_feed(&[404, 200], 3).await;
        let err = gw.fetch_price_series("ZZZZ", Lookback::OneYear).await.unwrap_err();
        let unavailable = err.downcast_ref::<SymbolUnavailable>().unwrap();
        assert_eq!(unavailable.status, Some(StatusCode::NOT_FOUND));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        assert_eq!(backoff(INITIAL_BACKOFF, 1), Duration::from_millis(500));
        assert_eq!(backoff(INITIAL_BACKOFF, 2), Duration::from_secs(1));
        assert_eq!(backoff(INITIAL_BACKOFF, 4), Duration::from_secs(4));
        assert_eq!(backoff(INITIAL_BACKOFF, 7), MAX_BACKOFF);
        assert_eq!(backoff(INITIAL_BACKOFF, 66), MAX_BACKOFF);
        assert_eq!(backoff(INITIAL_BACKOFF, u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn builds_chart_url_without_double_slash() {
        let mut settings = Settings::default();
        settings.market_data_base_url = "http://localhost:9000/".to_string();
        let gw = HttpChartGateway::from_settings(&settings).unwrap();
        assert_eq!(gw.url("AAPL"), "http://localhost:9000/v8/finance/chart/AAPL");
    }

    #[test]
    fn parses_successful_chart() {
        let body = json!({
            "chart": {
                "result": [{
                    "timestamp": [1767600000, 1767686400],
                    "indicators": {"adjclose": [{"adjclose": [100.0, 101.0]}]}
                }],
                "error": null
            }
        })
        .to_string();

        let series = parse_chart_response("MSFT", StatusCode::OK, &body).unwrap();
        assert_eq!(series.points.len(), 2);
        assert!((series.mean_daily_return().unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn not_found_is_not_retryable() {
        let body = json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        })
        .to_string();

        let err = parse_chart_response("ZZZZ", StatusCode::NOT_FOUND, &body).unwrap_err();
        let unavailable = err.downcast_ref::<SymbolUnavailable>().unwrap();
        assert_eq!(unavailable.status, Some(StatusCode::NOT_FOUND));
        assert!(unavailable.detail.contains("delisted"));
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = parse_chart_response("AAPL", StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(err.downcast_ref::<SymbolUnavailable>().is_none());

        let err = parse_chart_response("AAPL", StatusCode::TOO_MANY_REQUESTS, "").unwrap_err();
        assert!(err.downcast_ref::<SymbolUnavailable>().is_none());
    }

    #[test]
    fn empty_result_is_unavailable() {
        let body = json!({"chart": {"result": [], "error": null}}).to_string();
        let err = parse_chart_response("AAPL", StatusCode::OK, &body).unwrap_err();
        let unavailable = err.downcast_ref::<SymbolUnavailable>().unwrap();
        assert_eq!(unavailable.status, None);
    }

    #[test]
    fn garbage_success_body_is_an_error() {
        assert!(parse_chart_response("AAPL", StatusCode::OK, "not json").is_err());
    }
}

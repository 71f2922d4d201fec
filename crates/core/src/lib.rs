pub mod advice;
pub mod domain;
pub mod market;
pub mod recommend;
pub mod report;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    pub const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://query1.finance.yahoo.com";
    const DEFAULT_MARKET_DATA_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_MARKET_DATA_RETRIES: u32 = 3;
    const DEFAULT_RECOMMENDATION_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub market_data_base_url: String,
        pub market_data_timeout: Duration,
        pub market_data_retries: u32,
        pub recommendation_timeout: Duration,
        pub sentry_dsn: Option<String>,
        pub port: u16,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                market_data_base_url: DEFAULT_MARKET_DATA_BASE_URL.to_string(),
                market_data_timeout: Duration::from_secs(DEFAULT_MARKET_DATA_TIMEOUT_SECS),
                market_data_retries: DEFAULT_MARKET_DATA_RETRIES,
                recommendation_timeout: Duration::from_secs(DEFAULT_RECOMMENDATION_TIMEOUT_SECS),
                sentry_dsn: None,
                port: DEFAULT_PORT,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let market_data_base_url = std::env::var("MARKET_DATA_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.market_data_base_url);

            let market_data_timeout = match env_parse::<u64>("MARKET_DATA_TIMEOUT_SECS")? {
                Some(secs) => Duration::from_secs(secs),
                None => defaults.market_data_timeout,
            };

            let market_data_retries =
                env_parse::<u32>("MARKET_DATA_RETRIES")?.unwrap_or(defaults.market_data_retries);
            anyhow::ensure!(market_data_retries >= 1, "MARKET_DATA_RETRIES must be >= 1");

            let recommendation_timeout = match env_parse::<u64>("RECOMMENDATION_TIMEOUT_SECS")? {
                Some(secs) => Duration::from_secs(secs),
                None => defaults.recommendation_timeout,
            };

            Ok(Self {
                market_data_base_url,
                market_data_timeout,
                market_data_retries,
                recommendation_timeout,
                sentry_dsn: std::env::var("SENTRY_DSN").ok().filter(|s| !s.is_empty()),
                port: env_parse::<u16>("PORT")?.unwrap_or(defaults.port),
            })
        }
    }

    fn env_parse<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(key) {
            Ok(s) if !s.trim().is_empty() => s
                .trim()
                .parse::<T>()
                .map(Some)
                .with_context(|| format!("{key} is not valid: {s}")),
            _ => Ok(None),
        }
    }
}

pub mod memory;
pub mod provider;
pub mod types;

pub use memory::StaticGateway;
pub use provider::{HttpChartGateway, MarketDataGateway, SymbolUnavailable};
pub use types::{Lookback, PricePoint, PriceSeries, ReturnStats};

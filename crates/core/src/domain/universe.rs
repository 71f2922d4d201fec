use crate::domain::allocation::AssetClass;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickerUniverse {
    pub asset_class: AssetClass,
    pub symbols: &'static [&'static str],
}

pub const STOCKS: TickerUniverse = TickerUniverse {
    asset_class: AssetClass::Stocks,
    symbols: &["AAPL", "MSFT", "NVDA", "TSLA", "AMZN"],
};

pub const BONDS: TickerUniverse = TickerUniverse {
    asset_class: AssetClass::Bonds,
    symbols: &["BND", "LQD", "GOVT", "JNK"],
};

pub const REAL_ESTATE: TickerUniverse = TickerUniverse {
    asset_class: AssetClass::RealEstate,
    symbols: &["O", "AMT", "PLD", "PSA"],
};

/// Universes ranked for every submission. Cash has none.
pub const ALL: [TickerUniverse; 3] = [STOCKS, BONDS, REAL_ESTATE];

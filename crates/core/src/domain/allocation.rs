use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Stocks,
    Bonds,
    RealEstate,
    Cash,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [Self::Stocks, Self::Bonds, Self::RealEstate, Self::Cash];

    pub fn label(self) -> &'static str {
        match self {
            Self::Stocks => "Stocks",
            Self::Bonds => "Bonds",
            Self::RealEstate => "Real Estate",
            Self::Cash => "Cash",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AssetClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Percentages in `AssetClass::ALL` order. Always sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPlan {
    percentages: [u8; 4],
}

impl AllocationPlan {
    const fn new(stocks: u8, bonds: u8, real_estate: u8, cash: u8) -> Self {
        Self {
            percentages: [stocks, bonds, real_estate, cash],
        }
    }

    pub fn percent(&self, class: AssetClass) -> u8 {
        self.percentages[class as usize]
    }

    pub fn entries(&self) -> impl Iterator<Item = (AssetClass, u8)> + '_ {
        AssetClass::ALL.into_iter().zip(self.percentages)
    }

    pub fn total(&self) -> u32 {
        self.percentages.iter().map(|p| u32::from(*p)).sum()
    }
}

// Serialized as {"Stocks": 70, "Bonds": 20, "Real Estate": 5, "Cash": 5}, order preserved.
impl Serialize for AllocationPlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.percentages.len()))?;
        for (class, pct) in self.entries() {
            map.serialize_entry(class.label(), &pct)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationBand {
    /// 30 years or more.
    Growth,
    /// [20, 30)
    Balanced,
    /// [10, 20)
    Moderate,
    /// [5, 10)
    Conservative,
    /// Under 5 years, including negative horizons.
    Preservation,
}

impl AllocationBand {
    pub fn for_years_left(years_left: f64) -> Self {
        if years_left >= 30.0 {
            Self::Growth
        } else if years_left >= 20.0 {
            Self::Balanced
        } else if years_left >= 10.0 {
            Self::Moderate
        } else if years_left >= 5.0 {
            Self::Conservative
        } else {
            // NaN lands here too: every comparison above is false.
            Self::Preservation
        }
    }

    pub fn plan(self) -> AllocationPlan {
        match self {
            Self::Growth => AllocationPlan::new(80, 10, 5, 5),
            Self::Balanced => AllocationPlan::new(70, 20, 5, 5),
            Self::Moderate => AllocationPlan::new(60, 30, 5, 5),
            Self::Conservative => AllocationPlan::new(50, 40, 5, 5),
            Self::Preservation => AllocationPlan::new(30, 50, 10, 10),
        }
    }
}

pub fn asset_allocation(years_left: f64) -> AllocationPlan {
    AllocationBand::for_years_left(years_left).plan()
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// The class of a tracked asset.
/// Determines which price provider is asked for its market price, and is one
/// of the two category-key universes a plan can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetClass {
    /// Gold, silver and other commodities (XAU, XAG, ...)
    #[serde(rename = "Raw Materials")]
    RawMaterials,
    /// BTC, ETH, ...
    #[serde(rename = "Cryptocurrencies")]
    Cryptocurrencies,
    /// Equities, identified by ISIN
    #[serde(rename = "Stocks")]
    Stocks,
    /// Exchange traded funds, identified by ISIN
    #[serde(rename = "ETFs")]
    Etfs,
}

impl AssetClass {
    /// Every asset class in canonical order.
    pub const ALL: [AssetClass; 4] = [
        AssetClass::RawMaterials,
        AssetClass::Cryptocurrencies,
        AssetClass::Stocks,
        AssetClass::Etfs,
    ];

    /// The category key used for this class inside a plan.
    pub fn key(&self) -> &'static str {
        match self {
            AssetClass::RawMaterials => "Raw Materials",
            AssetClass::Cryptocurrencies => "Cryptocurrencies",
            AssetClass::Stocks => "Stocks",
            AssetClass::Etfs => "ETFs",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for AssetClass {
    type Err = CoreError;

    /// Case-insensitive match against the category key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        AssetClass::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// Risk bucket a holding is assigned to by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "High Risk")]
    HighRisk,
    #[default]
    #[serde(rename = "Medium Risk")]
    MediumRisk,
    #[serde(rename = "Low Risk")]
    LowRisk,
}

impl RiskCategory {
    /// Every risk category in canonical order.
    pub const ALL: [RiskCategory; 3] = [
        RiskCategory::HighRisk,
        RiskCategory::MediumRisk,
        RiskCategory::LowRisk,
    ];

    /// The category key used for this risk bucket inside a plan.
    pub fn key(&self) -> &'static str {
        match self {
            RiskCategory::HighRisk => "High Risk",
            RiskCategory::MediumRisk => "Medium Risk",
            RiskCategory::LowRisk => "Low Risk",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for RiskCategory {
    type Err = CoreError;

    /// Case-insensitive match; the short form without the "Risk" suffix
    /// (e.g. "high") is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RiskCategory::ALL
            .into_iter()
            .find(|c| {
                let key = c.key();
                key.eq_ignore_ascii_case(wanted)
                    || key
                        .strip_suffix(" Risk")
                        .is_some_and(|short| short.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// A position in the portfolio: how much of one asset the user holds.
///
/// The price is not entered by the user; it is filled in by
/// `PriceService::refresh_prices` and stays `None` until a lookup succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier
    pub id: Uuid,

    /// Asset class; selects the price provider
    pub asset_class: AssetClass,

    /// Ticker, ISIN or commodity code (e.g. "BTC", "IE00B5BMR087", "XAU")
    pub code: String,

    /// Display name
    pub name: String,

    /// Quantity held
    pub amount: f64,

    /// Last known unit price in the selected currency
    #[serde(default)]
    pub current_price: Option<f64>,

    /// User-assigned risk bucket
    #[serde(default)]
    pub category: RiskCategory,
}

impl Holding {
    pub fn new(
        asset_class: AssetClass,
        code: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        category: RiskCategory,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_class,
            code: code.into(),
            name: name.into(),
            amount,
            current_price: None,
            category,
        }
    }

    /// Market value of this holding. A holding without a price is worth 0.
    pub fn value(&self) -> f64 {
        self.amount * self.current_price.unwrap_or(0.0)
    }

    /// Two holdings refer to the same asset when code and class match.
    pub fn same_asset(&self, other: &Holding) -> bool {
        self.code == other.code && self.asset_class == other.asset_class
    }
}

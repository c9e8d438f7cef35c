use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::asset::AssetClass;

/// Currency all prices and values are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[default]
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Eur];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Which asset classes take part in totals, distributions and
/// asset-class plans.
///
/// An empty set is never observable: it is normalized back to "all enabled",
/// both on construction and after deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AssetClass>", into = "Vec<AssetClass>")]
pub struct AssetClassSettings {
    enabled: BTreeSet<AssetClass>,
}

impl AssetClassSettings {
    /// All classes enabled.
    pub fn all_enabled() -> Self {
        Self {
            enabled: AssetClass::ALL.into_iter().collect(),
        }
    }

    /// Enable exactly the given classes. Falls back to all when `classes` is empty.
    pub fn with_enabled(classes: impl IntoIterator<Item = AssetClass>) -> Self {
        let enabled: BTreeSet<AssetClass> = classes.into_iter().collect();
        if enabled.is_empty() {
            Self::all_enabled()
        } else {
            Self { enabled }
        }
    }

    pub fn is_enabled(&self, asset_class: AssetClass) -> bool {
        self.enabled.contains(&asset_class)
    }

    /// Flip a single class. Disabling the last enabled class is allowed here;
    /// the empty set only normalizes back to "all" on the next load.
    pub fn toggle(&mut self, asset_class: AssetClass) {
        if !self.enabled.remove(&asset_class) {
            self.enabled.insert(asset_class);
        }
    }

    pub fn set_enabled(&mut self, asset_class: AssetClass, enabled: bool) {
        if enabled {
            self.enabled.insert(asset_class);
        } else {
            self.enabled.remove(&asset_class);
        }
    }

    /// Enabled classes in canonical `AssetClass::ALL` order.
    pub fn enabled_classes(&self) -> Vec<AssetClass> {
        AssetClass::ALL
            .into_iter()
            .filter(|c| self.enabled.contains(c))
            .collect()
    }
}

impl Default for AssetClassSettings {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl From<Vec<AssetClass>> for AssetClassSettings {
    fn from(classes: Vec<AssetClass>) -> Self {
        Self::with_enabled(classes)
    }
}

impl From<AssetClassSettings> for Vec<AssetClass> {
    fn from(settings: AssetClassSettings) -> Self {
        settings.enabled_classes()
    }
}

/// User-configurable settings, stored next to the holdings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The currency prices are fetched in and values are displayed in.
    #[serde(default)]
    pub currency: Currency,

    /// Asset classes included in totals and asset-class plans.
    #[serde(default)]
    pub asset_classes: AssetClassSettings,
}

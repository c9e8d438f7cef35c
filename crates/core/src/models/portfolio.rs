use serde::{Deserialize, Serialize};

use super::asset::Holding;
use super::settings::Settings;

/// The main data container for holdings. Everything in here gets
/// serialized and saved by `StorageManager`.
///
/// Plans are not part of it: they live in their own `PlanStore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// All holdings, in insertion order
    pub holdings: Vec<Holding>,

    /// User settings (currency, enabled asset classes)
    #[serde(default)]
    pub settings: Settings,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::{AssetClass, RiskCategory};

/// A plan is valid when its percentages sum to 100 within this tolerance.
pub const PLAN_TOTAL_TOLERANCE: f64 = 0.01;

/// Which category-key universe a plan distributes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanTargetType {
    /// Keys are `RiskCategory` keys; every category always participates.
    #[serde(rename = "Risk Class")]
    RiskClass,
    /// Keys are `AssetClass` keys; only enabled classes participate.
    #[serde(rename = "Asset Class")]
    AssetClass,
}

impl std::fmt::Display for PlanTargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanTargetType::RiskClass => write!(f, "Risk Class"),
            PlanTargetType::AssetClass => write!(f, "Asset Class"),
        }
    }
}

/// Target share of one category inside a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDistribution {
    /// Category key (a `RiskCategory` or `AssetClass` key)
    pub key: String,

    /// Target percentage, conceptually 0..=100
    pub percentage: f64,
}

impl PlanDistribution {
    pub fn new(key: impl Into<String>, percentage: f64) -> Self {
        Self {
            key: key.into(),
            percentage,
        }
    }
}

/// A user-defined target allocation.
///
/// The set of keys is fixed when the plan is created; afterwards only the
/// percentages change. Plans whose percentages do not add up to 100 can
/// still be stored and analyzed, they are merely flagged by `is_valid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,

    pub name: String,

    pub target_type: PlanTargetType,

    /// Ordered, unique by key
    pub distributions: Vec<PlanDistribution>,

    pub created_at: DateTime<Utc>,

    /// Updated whenever the name or a distribution entry changes
    pub modified_at: DateTime<Utc>,
}

impl Plan {
    /// Create a plan seeded with one 0% entry per key of `universe`.
    ///
    /// Input order is preserved; repeated keys are kept only once.
    pub fn new<I, K>(name: impl Into<String>, target_type: PlanTargetType, universe: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut distributions: Vec<PlanDistribution> = Vec::new();
        for key in universe {
            let key = key.into();
            if !distributions.iter().any(|d| d.key == key) {
                distributions.push(PlanDistribution::new(key, 0.0));
            }
        }

        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_type,
            distributions,
            created_at: now,
            modified_at: now,
        }
    }

    /// Risk-class plan over all risk categories.
    pub fn new_risk_class_plan(name: impl Into<String>) -> Self {
        Self::new(
            name,
            PlanTargetType::RiskClass,
            RiskCategory::ALL.iter().map(|c| c.key()),
        )
    }

    /// Asset-class plan over the given classes (all classes when `enabled` is empty).
    pub fn new_asset_class_plan(name: impl Into<String>, enabled: &[AssetClass]) -> Self {
        let classes: &[AssetClass] = if enabled.is_empty() {
            &AssetClass::ALL
        } else {
            enabled
        };
        Self::new(
            name,
            PlanTargetType::AssetClass,
            classes.iter().map(|c| c.key()),
        )
    }

    /// Sum of all target percentages.
    pub fn total_percentage(&self) -> f64 {
        self.distributions.iter().map(|d| d.percentage).sum()
    }

    /// `true` when the percentages add up to 100 (±0.01).
    pub fn is_valid(&self) -> bool {
        (self.total_percentage() - 100.0).abs() < PLAN_TOTAL_TOLERANCE
    }

    pub fn distribution(&self, key: &str) -> Option<&PlanDistribution> {
        self.distributions.iter().find(|d| d.key == key)
    }

    /// Distributions taking part in an analysis.
    ///
    /// Asset-class plans are filtered down to `enabled`; risk-class plans
    /// are returned whole, risk categories cannot be disabled.
    pub fn enabled_distributions(&self, enabled: &[AssetClass]) -> Vec<PlanDistribution> {
        match self.target_type {
            PlanTargetType::RiskClass => self.distributions.clone(),
            PlanTargetType::AssetClass => self
                .distributions
                .iter()
                .filter(|d| enabled.iter().any(|c| c.key() == d.key))
                .cloned()
                .collect(),
        }
    }

    /// Replace the percentage of the entry with `key` and stamp `modified_at`.
    ///
    /// Unknown keys are ignored; the entry set never grows after creation.
    /// Returns whether an entry was updated.
    pub fn upsert_distribution(&mut self, key: &str, percentage: f64) -> bool {
        match self.distributions.iter_mut().find(|d| d.key == key) {
            Some(entry) => {
                entry.percentage = percentage;
                self.modified_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.modified_at = Utc::now();
    }
}

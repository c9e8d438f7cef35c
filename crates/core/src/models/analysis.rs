use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::plan::Plan;

/// Percentage-point delta above which a category is reported as off-target.
pub const REBALANCING_THRESHOLD: f64 = 0.01;

/// Current state of the portfolio, keyed by category.
///
/// Never persisted; derived from live holdings right before an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Total portfolio value in the selected currency
    pub total_value: f64,

    /// Category key → percentage of `total_value` (0..=100)
    pub current_distribution: HashMap<String, f64>,
}

impl PortfolioSnapshot {
    pub fn new(total_value: f64, current_distribution: HashMap<String, f64>) -> Self {
        Self {
            total_value,
            current_distribution,
        }
    }

    /// Current percentage for `key`; categories without holdings are at 0%.
    pub fn percentage(&self, key: &str) -> f64 {
        self.current_distribution.get(key).copied().unwrap_or(0.0)
    }
}

/// Gap between the current and the target allocation of one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDiscrepancy {
    pub key: String,

    pub current_percentage: f64,

    pub target_percentage: f64,

    pub current_value: f64,

    /// Target share of the projected total
    pub target_value: f64,

    /// Amount to add to this category (never negative, nothing is sold)
    pub discrepancy_value: f64,

    /// Projected final percentage minus current percentage
    pub discrepancy_percentage: f64,
}

impl PlanDiscrepancy {
    pub fn needs_rebalancing(&self) -> bool {
        self.discrepancy_percentage.abs() > REBALANCING_THRESHOLD
    }
}

/// Raw solver output: one discrepancy per distribution entry plus the total
/// the portfolio would reach after all additions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalancingOutcome {
    pub discrepancies: Vec<PlanDiscrepancy>,
    pub projected_total_value: f64,
}

/// Result of analyzing a plan against the current portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAnalysis {
    pub plan: Plan,

    pub discrepancies: Vec<PlanDiscrepancy>,

    pub total_portfolio_value: f64,

    /// Portfolio value after every suggested addition
    pub projected_total_value: f64,

    /// `true` if any category needs rebalancing
    pub is_rebalancing_needed: bool,
}

impl PlanAnalysis {
    pub fn new(plan: Plan, outcome: RebalancingOutcome, total_portfolio_value: f64) -> Self {
        let is_rebalancing_needed = outcome
            .discrepancies
            .iter()
            .any(PlanDiscrepancy::needs_rebalancing);
        Self {
            plan,
            discrepancies: outcome.discrepancies,
            total_portfolio_value,
            projected_total_value: outcome.projected_total_value,
            is_rebalancing_needed,
        }
    }

    /// Total amount of money to invest to carry out the plan.
    pub fn total_rebalancing_amount(&self) -> f64 {
        self.discrepancies
            .iter()
            .filter(|d| d.discrepancy_value > 0.0)
            .map(|d| d.discrepancy_value)
            .sum()
    }

    pub fn discrepancy(&self, key: &str) -> Option<&PlanDiscrepancy> {
        self.discrepancies.iter().find(|d| d.key == key)
    }
}

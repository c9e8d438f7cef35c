use std::collections::HashMap;
use tracing::debug;

use crate::models::analysis::{PlanDiscrepancy, RebalancingOutcome};
use crate::models::plan::PlanDistribution;

/// Computes additions-only rebalancing: how much to buy of each category so
/// the portfolio gets as close as possible to a plan, without selling.
///
/// Pure functions only; no I/O, no shared state.
pub struct RebalancingService;

/// One distribution entry joined with its current state.
struct CategoryPosition<'a> {
    key: &'a str,
    target_percentage: f64,
    current_percentage: f64,
    current_value: f64,
}

impl CategoryPosition<'_> {
    fn is_underfunded(&self) -> bool {
        self.current_percentage < self.target_percentage
    }
}

impl RebalancingService {
    /// Compare `distributions` against `current_distribution` (category key →
    /// percentage of `total_value`) and compute the additions that bring every
    /// underfunded category to its target share of the grown portfolio.
    ///
    /// Categories missing from `current_distribution` are at 0%. When the
    /// targets cannot be met by additions alone the projected total stays at
    /// `total_value` and no extra money is suggested beyond that state.
    pub fn analyze(
        distributions: &[PlanDistribution],
        current_distribution: &HashMap<String, f64>,
        total_value: f64,
    ) -> RebalancingOutcome {
        let positions: Vec<CategoryPosition<'_>> = distributions
            .iter()
            .map(|d| {
                let current_percentage = current_distribution.get(&d.key).copied().unwrap_or(0.0);
                CategoryPosition {
                    key: &d.key,
                    target_percentage: d.percentage,
                    current_percentage,
                    current_value: total_value * (current_percentage / 100.0),
                }
            })
            .collect();

        let mut underfunded_count = 0usize;
        let mut underfunded_target_share = 0.0;
        let mut underfunded_value = 0.0;
        let mut overfunded_value = 0.0;

        for position in &positions {
            if position.is_underfunded() {
                underfunded_count += 1;
                underfunded_target_share += position.target_percentage / 100.0;
                underfunded_value += position.current_value;
            } else {
                overfunded_value += position.current_value;
            }
        }

        debug!(
            categories = positions.len(),
            underfunded = underfunded_count,
            overfunded_value,
            "analyzing plan distribution"
        );

        if underfunded_count == 0 {
            let discrepancies = positions
                .iter()
                .map(|p| PlanDiscrepancy {
                    key: p.key.to_string(),
                    current_percentage: p.current_percentage,
                    target_percentage: p.target_percentage,
                    current_value: p.current_value,
                    target_value: p.current_value,
                    discrepancy_value: 0.0,
                    discrepancy_percentage: p.target_percentage - p.current_percentage,
                })
                .collect();
            return RebalancingOutcome {
                discrepancies,
                projected_total_value: total_value,
            };
        }

        let projected_total_value =
            match Self::required_addition(total_value, underfunded_target_share, underfunded_value) {
                Some(addition) => total_value + addition,
                None => {
                    debug!(
                        total_value,
                        underfunded_target_share,
                        "targets unreachable by additions alone; keeping current total"
                    );
                    total_value
                }
            };

        let discrepancies = positions
            .iter()
            .map(|p| {
                let target_value = projected_total_value * (p.target_percentage / 100.0);
                let discrepancy_value = (target_value - p.current_value).max(0.0);
                let final_value = p.current_value + discrepancy_value;
                let final_percentage = if projected_total_value > 0.0 {
                    final_value / projected_total_value * 100.0
                } else {
                    p.current_percentage
                };
                PlanDiscrepancy {
                    key: p.key.to_string(),
                    current_percentage: p.current_percentage,
                    target_percentage: p.target_percentage,
                    current_value: p.current_value,
                    target_value,
                    discrepancy_value,
                    discrepancy_percentage: final_percentage - p.current_percentage,
                }
            })
            .collect();

        RebalancingOutcome {
            discrepancies,
            projected_total_value,
        }
    }

    /// Smallest amount `X` to add so that every underfunded category reaches
    /// its target share of the new total `N = total_value + X`.
    ///
    /// With `P` the summed target share of the underfunded categories and `C`
    /// their summed current value, every underfunded category ends at
    /// `N * p_i`, so the additions total
    ///
    /// ```text
    /// X = N*P - C = (total_value + X)*P - C
    /// X * (1 - P) = total_value*P - C
    /// X = (total_value*P - C) / (1 - P)
    /// ```
    ///
    /// Returns `None` when no non-negative solution exists: `P >= 1` (the
    /// underfunded targets alone claim the whole portfolio) or a negative
    /// numerator.
    pub fn required_addition(total_value: f64, target_share: f64, underfunded_value: f64) -> Option<f64> {
        if target_share >= 1.0 {
            return None;
        }
        let numerator = total_value * target_share - underfunded_value;
        let denominator = 1.0 - target_share;
        if denominator > 0.0 && numerator >= 0.0 {
            Some(numerator / denominator)
        } else {
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Rebalancing Tests — additions-only solver, closed-form addition,
// infeasible fallbacks, properties
// ═══════════════════════════════════════════════════════════════════

use std::collections::HashMap;

use financial_overview_core::models::analysis::{PlanAnalysis, RebalancingOutcome};
use financial_overview_core::models::plan::{Plan, PlanDistribution, PlanTargetType};
use financial_overview_core::services::rebalancing_service::RebalancingService;
use proptest::prelude::*;

fn dists(entries: &[(&str, f64)]) -> Vec<PlanDistribution> {
    entries
        .iter()
        .map(|(k, p)| PlanDistribution::new(*k, *p))
        .collect()
}

fn current(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries.iter().map(|(k, p)| (k.to_string(), *p)).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn find<'a>(outcome: &'a RebalancingOutcome, key: &str) -> &'a financial_overview_core::models::analysis::PlanDiscrepancy {
    outcome
        .discrepancies
        .iter()
        .find(|d| d.key == key)
        .unwrap_or_else(|| panic!("no discrepancy for {key}"))
}

// ═══════════════════════════════════════════════════════════════════
// Already on target / nothing underfunded
// ═══════════════════════════════════════════════════════════════════

mod no_underfunded {
    use super::*;

    #[test]
    fn exactly_on_target_is_a_no_op() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 60.0), ("B", 40.0)]),
            &current(&[("A", 60.0), ("B", 40.0)]),
            500.0,
        );

        assert_close(out.projected_total_value, 500.0);
        for d in &out.discrepancies {
            assert_eq!(d.discrepancy_value, 0.0);
            assert_close(d.discrepancy_percentage, 0.0);
            assert!(!d.needs_rebalancing());
        }
        assert_close(find(&out, "A").current_value, 300.0);
        assert_close(find(&out, "A").target_value, 300.0);
        assert_close(find(&out, "B").target_value, 200.0);
    }

    #[test]
    fn overfunded_everywhere_reports_percentage_gap_without_money() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 40.0), ("B", 40.0)]),
            &current(&[("A", 50.0), ("B", 50.0)]),
            1000.0,
        );

        assert_close(out.projected_total_value, 1000.0);
        let a = find(&out, "A");
        assert_eq!(a.discrepancy_value, 0.0);
        assert_close(a.target_value, a.current_value);
        assert_close(a.discrepancy_percentage, -10.0);
        assert!(a.needs_rebalancing());
    }

    #[test]
    fn empty_distribution_list() {
        let out = RebalancingService::analyze(&[], &HashMap::new(), 1234.0);
        assert!(out.discrepancies.is_empty());
        assert_close(out.projected_total_value, 1234.0);
    }

    #[test]
    fn preserves_distribution_order() {
        let out = RebalancingService::analyze(
            &dists(&[("Z", 10.0), ("A", 50.0), ("M", 40.0)]),
            &current(&[("Z", 10.0), ("A", 50.0), ("M", 40.0)]),
            100.0,
        );
        let keys: Vec<&str> = out.discrepancies.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["Z", "A", "M"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Feasible additions
// ═══════════════════════════════════════════════════════════════════

mod feasible {
    use super::*;

    #[test]
    fn two_categories_half_half() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 50.0), ("B", 50.0)]),
            &current(&[("A", 100.0), ("B", 0.0)]),
            1000.0,
        );

        assert_close(out.projected_total_value, 2000.0);

        let a = find(&out, "A");
        assert_close(a.current_value, 1000.0);
        assert_close(a.target_value, 1000.0);
        assert_close(a.discrepancy_value, 0.0);
        assert_close(a.discrepancy_percentage, -50.0);

        let b = find(&out, "B");
        assert_close(b.current_value, 0.0);
        assert_close(b.target_value, 1000.0);
        assert_close(b.discrepancy_value, 1000.0);
        assert_close(b.discrepancy_percentage, 50.0);
    }

    #[test]
    fn missing_current_entry_counts_as_zero() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 50.0), ("B", 50.0)]),
            &current(&[("A", 100.0)]),
            1000.0,
        );
        assert_close(find(&out, "B").current_percentage, 0.0);
        assert_close(find(&out, "B").discrepancy_value, 1000.0);
    }

    #[test]
    fn two_underfunded_one_overfunded() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 50.0), ("B", 30.0), ("C", 20.0)]),
            &current(&[("A", 70.0), ("B", 20.0), ("C", 10.0)]),
            1000.0,
        );

        // P = 0.5, C = 300 → X = (500 - 300) / 0.5 = 400
        assert_close(out.projected_total_value, 1400.0);
        assert_close(find(&out, "A").discrepancy_value, 0.0);
        assert_close(find(&out, "B").discrepancy_value, 220.0);
        assert_close(find(&out, "C").discrepancy_value, 180.0);

        // every category lands exactly on target
        assert_close(find(&out, "A").discrepancy_percentage, 50.0 - 70.0);
        assert_close(find(&out, "B").discrepancy_percentage, 30.0 - 20.0);
        assert_close(find(&out, "C").discrepancy_percentage, 20.0 - 10.0);
    }

    #[test]
    fn single_overfunded_category_lands_on_its_share() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 40.0), ("B", 30.0), ("C", 30.0)]),
            &current(&[("A", 70.0), ("B", 20.0), ("C", 10.0)]),
            1000.0,
        );

        // P = 0.6, C = 300 → X = 300 / 0.4 = 750
        assert_close(out.projected_total_value, 1750.0);
        assert_close(find(&out, "A").target_value, 700.0);
        assert_close(find(&out, "A").discrepancy_value, 0.0);
        assert_close(find(&out, "B").discrepancy_value, 325.0);
        assert_close(find(&out, "C").discrepancy_value, 425.0);
    }

    #[test]
    fn single_underfunded_category() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 25.0), ("B", 75.0)]),
            &current(&[("A", 0.0), ("B", 100.0)]),
            400.0,
        );

        // X = (400 * 0.25) / 0.75
        let x = 100.0 / 0.75;
        assert_close(out.projected_total_value, 400.0 + x);
        assert_close(find(&out, "A").discrepancy_value, x);
        assert_close(find(&out, "B").discrepancy_value, 0.0);
        assert_close(find(&out, "B").target_value, 400.0);
    }

    #[test]
    fn overfunded_category_below_share_of_grown_total_gets_topped_up() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 20.0), ("B", 20.0), ("C", 60.0)]),
            &current(&[("A", 40.0), ("B", 30.0), ("C", 30.0)]),
            1000.0,
        );

        // Only C is underfunded: P = 0.6, C = 300 → X = 750, N = 1750
        assert_close(out.projected_total_value, 1750.0);

        let a = find(&out, "A");
        assert_close(a.target_value, 350.0);
        assert_close(a.discrepancy_value, 0.0);
        assert_close(a.discrepancy_percentage, 400.0 / 1750.0 * 100.0 - 40.0);

        let b = find(&out, "B");
        assert_close(b.target_value, 350.0);
        assert_close(b.discrepancy_value, 50.0);
        assert_close(b.discrepancy_percentage, 20.0 - 30.0);

        let c = find(&out, "C");
        assert_close(c.discrepancy_value, 750.0);
        assert_close(c.discrepancy_percentage, 30.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Infeasible targets and empty portfolios
// ═══════════════════════════════════════════════════════════════════

mod infeasible {
    use super::*;

    #[test]
    fn underfunded_targets_reaching_100_keep_total() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 100.0), ("B", 0.0)]),
            &current(&[("A", 50.0), ("B", 50.0)]),
            1000.0,
        );

        assert_close(out.projected_total_value, 1000.0);
        let a = find(&out, "A");
        assert_close(a.target_value, 1000.0);
        assert_close(a.discrepancy_value, 500.0);
        assert_close(a.discrepancy_percentage, 50.0);

        let b = find(&out, "B");
        assert_close(b.target_value, 0.0);
        assert_close(b.discrepancy_value, 0.0);
        assert_close(b.discrepancy_percentage, 0.0);
    }

    #[test]
    fn underfunded_targets_above_100_keep_total() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 70.0), ("B", 60.0)]),
            &current(&[("A", 10.0), ("B", 20.0)]),
            1000.0,
        );
        assert_close(out.projected_total_value, 1000.0);
        for d in &out.discrepancies {
            assert!(d.discrepancy_value >= 0.0);
            assert!(d.discrepancy_value.is_finite());
        }
    }

    #[test]
    fn zero_total_value_moves_no_money() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 50.0), ("B", 30.0)]),
            &HashMap::new(),
            0.0,
        );

        assert_close(out.projected_total_value, 0.0);
        for d in &out.discrepancies {
            assert_eq!(d.current_value, 0.0);
            assert_eq!(d.target_value, 0.0);
            assert_eq!(d.discrepancy_value, 0.0);
            assert_eq!(d.discrepancy_percentage, 0.0);
        }
    }

    #[test]
    fn zero_total_value_with_full_plan() {
        let out = RebalancingService::analyze(
            &dists(&[("A", 50.0), ("B", 50.0)]),
            &HashMap::new(),
            0.0,
        );
        assert_close(out.projected_total_value, 0.0);
        assert!(out.discrepancies.iter().all(|d| d.discrepancy_value == 0.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// required_addition — the closed form itself
// ═══════════════════════════════════════════════════════════════════

mod required_addition {
    use super::*;

    #[test]
    fn closed_form_value() {
        let x = RebalancingService::required_addition(1000.0, 0.5, 0.0).unwrap();
        assert_close(x, 1000.0);
    }

    #[test]
    fn zero_when_already_at_share() {
        let x = RebalancingService::required_addition(1000.0, 0.3, 300.0).unwrap();
        assert_close(x, 0.0);
    }

    #[test]
    fn none_for_share_of_one_or_more() {
        assert!(RebalancingService::required_addition(1000.0, 1.0, 0.0).is_none());
        assert!(RebalancingService::required_addition(1000.0, 1.5, 0.0).is_none());
    }

    #[test]
    fn none_for_negative_numerator() {
        assert!(RebalancingService::required_addition(1000.0, 0.5, 600.0).is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// PlanAnalysis built from a solver outcome
// ═══════════════════════════════════════════════════════════════════

mod plan_analysis {
    use super::*;

    #[test]
    fn aggregates_flags_and_amounts() {
        let mut plan = Plan::new("Growth", PlanTargetType::AssetClass, ["A", "B", "C"]);
        plan.upsert_distribution("A", 50.0);
        plan.upsert_distribution("B", 30.0);
        plan.upsert_distribution("C", 20.0);

        let outcome = RebalancingService::analyze(
            &plan.distributions,
            &current(&[("A", 70.0), ("B", 20.0), ("C", 10.0)]),
            1000.0,
        );
        let analysis = PlanAnalysis::new(plan.clone(), outcome, 1000.0);

        assert!(analysis.is_rebalancing_needed);
        assert_close(analysis.total_rebalancing_amount(), 400.0);
        assert_close(analysis.projected_total_value, 1400.0);
        assert_close(analysis.total_portfolio_value, 1000.0);
        assert_eq!(analysis.plan, plan);
        assert!(analysis.discrepancy("B").is_some());
        assert!(analysis.discrepancy("Z").is_none());
    }

    #[test]
    fn on_target_needs_no_rebalancing() {
        let outcome = RebalancingService::analyze(
            &dists(&[("A", 50.0), ("B", 50.0)]),
            &current(&[("A", 50.0), ("B", 50.0)]),
            800.0,
        );
        let analysis = PlanAnalysis::new(
            Plan::new("Flat", PlanTargetType::RiskClass, ["A", "B"]),
            outcome,
            800.0,
        );
        assert!(!analysis.is_rebalancing_needed);
        assert_eq!(analysis.total_rebalancing_amount(), 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════

fn keyed(targets: &[u8], currents: &[u8]) -> (Vec<PlanDistribution>, HashMap<String, f64>) {
    let distributions = targets
        .iter()
        .enumerate()
        .map(|(i, t)| PlanDistribution::new(format!("K{i}"), f64::from(*t)))
        .collect();
    let current = currents
        .iter()
        .enumerate()
        .map(|(i, c)| (format!("K{i}"), f64::from(*c)))
        .collect();
    (distributions, current)
}

proptest! {
    #[test]
    fn discrepancy_values_are_never_negative(
        targets in prop::collection::vec(0.0f64..=100.0, 1..6),
        currents in prop::collection::vec(0.0f64..=100.0, 6),
        total in 0.0f64..1.0e7,
    ) {
        let distributions: Vec<PlanDistribution> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| PlanDistribution::new(format!("K{i}"), *t))
            .collect();
        let current: HashMap<String, f64> = currents
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("K{i}"), *c))
            .collect();

        let out = RebalancingService::analyze(&distributions, &current, total);

        prop_assert_eq!(out.discrepancies.len(), distributions.len());
        prop_assert!(out.projected_total_value.is_finite());
        prop_assert!(out.projected_total_value >= total);
        for d in &out.discrepancies {
            prop_assert!(d.discrepancy_value >= 0.0);
            prop_assert!(d.discrepancy_value.is_finite());
        }
    }

    #[test]
    fn solver_is_homogeneous_in_total_value(
        targets in prop::collection::vec(0u8..=100, 1..6),
        currents in prop::collection::vec(0u8..=100, 6),
        total in 1.0f64..1.0e6,
        factor in 0.5f64..10.0,
    ) {
        let (distributions, current) = keyed(&targets, &currents);

        let base = RebalancingService::analyze(&distributions, &current, total);
        let scaled = RebalancingService::analyze(&distributions, &current, total * factor);

        let tolerance = 1e-9 * (1.0 + scaled.projected_total_value.abs());
        prop_assert!((scaled.projected_total_value - base.projected_total_value * factor).abs() < tolerance);
        for (b, s) in base.discrepancies.iter().zip(&scaled.discrepancies) {
            prop_assert!((s.discrepancy_value - b.discrepancy_value * factor).abs() < tolerance);
        }
    }

    #[test]
    fn underfunded_targets_of_100_or_more_keep_total(
        extra in 0u8..=50,
        first_current in 0u8..100,
        rest in prop::collection::vec((0u8..=100, 0u8..=100), 0..4),
        total in 0.0f64..1.0e6,
    ) {
        // K0 alone claims >= 100% and is underfunded
        let mut targets = vec![100u8.saturating_add(extra)];
        let mut currents = vec![first_current];
        for (t, c) in &rest {
            targets.push(*t);
            currents.push(*c);
        }
        let (distributions, current) = keyed(&targets, &currents);

        let out = RebalancingService::analyze(&distributions, &current, total);

        prop_assert_eq!(out.projected_total_value, total);
        for d in &out.discrepancies {
            prop_assert!(d.discrepancy_value >= 0.0);
        }
    }
}

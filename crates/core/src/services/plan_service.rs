use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::analysis::{PlanAnalysis, PortfolioSnapshot};
use crate::models::asset::AssetClass;
use crate::models::plan::{Plan, PlanTargetType};
use crate::services::holdings_service::HoldingsValuation;
use crate::services::rebalancing_service::RebalancingService;
use crate::storage::plan_store::PlanStore;

/// Owns the ordered list of plans and keeps the store in sync with it.
///
/// Every successful mutation is followed by an explicit save of the whole
/// list. When that save fails the mutation stays applied in memory and the
/// caller gets `CoreError::Persistence`; the next successful save catches
/// the store up. Mutators take `&mut self`, so writes are serialized.
pub struct PlanRegistry<S: PlanStore> {
    store: S,
    plans: Vec<Plan>,
}

impl<S: PlanStore> PlanRegistry<S> {
    /// Load the existing plans from `store`.
    pub fn open(store: S) -> Result<Self, CoreError> {
        let plans = store.load_plans()?;
        info!(count = plans.len(), "loaded plans");
        Ok(Self { store, plans })
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn get(&self, id: Uuid) -> Option<&Plan> {
        self.plans.iter().find(|p| p.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a new plan and save.
    pub fn create(&mut self, plan: Plan) -> Result<&Plan, CoreError> {
        Self::validate(&plan)?;
        if self.get(plan.id).is_some() {
            return Err(CoreError::ValidationError(format!(
                "Plan {} already exists",
                plan.id
            )));
        }

        info!(plan = %plan.id, name = %plan.name, "creating plan");
        let id = plan.id;
        self.plans.push(plan);
        self.save()?;
        self.get(id).ok_or_else(|| CoreError::PlanNotFound(id.to_string()))
    }

    /// Replace the stored plan with the same id and save.
    pub fn update(&mut self, plan: Plan) -> Result<&Plan, CoreError> {
        Self::validate(&plan)?;
        let idx = self.index_of(plan.id)?;

        info!(plan = %plan.id, name = %plan.name, "updating plan");
        self.plans[idx] = plan;
        self.save()?;
        Ok(&self.plans[idx])
    }

    /// Remove a plan by id, save, and hand the removed plan back.
    pub fn delete(&mut self, id: Uuid) -> Result<Plan, CoreError> {
        let idx = self.index_of(id)?;

        info!(plan = %id, "deleting plan");
        let removed = self.plans.remove(idx);
        self.save()?;
        Ok(removed)
    }

    /// Write the current list to the store.
    pub fn save(&self) -> Result<(), CoreError> {
        self.store.save_plans(&self.plans).map_err(|e| {
            warn!(error = %e, "failed to save plans");
            match e {
                CoreError::Persistence(msg) => CoreError::Persistence(msg),
                other => CoreError::Persistence(other.to_string()),
            }
        })
    }

    /// Analyze a plan against the current holdings.
    ///
    /// `enabled` is the set of asset classes currently switched on; it limits
    /// asset-class plans and the holdings counted in the totals.
    pub fn analyze_plan<V>(&self, plan: &Plan, valuation: &V, enabled: &[AssetClass]) -> PlanAnalysis
    where
        V: HoldingsValuation + ?Sized,
    {
        let snapshot = Self::snapshot_for(plan, valuation, enabled);
        let distributions = plan.enabled_distributions(enabled);
        let outcome = RebalancingService::analyze(
            &distributions,
            &snapshot.current_distribution,
            snapshot.total_value,
        );
        PlanAnalysis::new(plan.clone(), outcome, snapshot.total_value)
    }

    /// Look a plan up by id and analyze it.
    pub fn analyze_plan_by_id<V>(
        &self,
        id: Uuid,
        valuation: &V,
        enabled: &[AssetClass],
    ) -> Result<PlanAnalysis, CoreError>
    where
        V: HoldingsValuation + ?Sized,
    {
        let plan = self
            .get(id)
            .ok_or_else(|| CoreError::PlanNotFound(id.to_string()))?;
        Ok(self.analyze_plan(plan, valuation, enabled))
    }

    /// Current distribution in the plan's key universe: every risk category
    /// for risk-class plans, the enabled asset classes otherwise.
    pub fn snapshot_for<V>(plan: &Plan, valuation: &V, enabled: &[AssetClass]) -> PortfolioSnapshot
    where
        V: HoldingsValuation + ?Sized,
    {
        let current_distribution: HashMap<String, f64> = match plan.target_type {
            PlanTargetType::RiskClass => valuation
                .risk_category_distribution(enabled)
                .into_iter()
                .map(|(category, pct)| (category.key().to_string(), pct))
                .collect(),
            PlanTargetType::AssetClass => {
                let by_class = valuation.asset_class_distribution(enabled);
                enabled
                    .iter()
                    .map(|c| (c.key().to_string(), by_class.get(c).copied().unwrap_or(0.0)))
                    .collect()
            }
        };
        PortfolioSnapshot::new(valuation.total_value(enabled), current_distribution)
    }

    fn index_of(&self, id: Uuid) -> Result<usize, CoreError> {
        self.plans
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PlanNotFound(id.to_string()))
    }

    fn validate(plan: &Plan) -> Result<(), CoreError> {
        if plan.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Plan name must not be empty".into()));
        }
        Ok(())
    }
}

impl<S: PlanStore> std::fmt::Debug for PlanRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanRegistry")
            .field("plans", &self.plans.len())
            .finish()
    }
}

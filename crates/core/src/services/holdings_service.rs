use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding, RiskCategory};

/// Source of the current portfolio distribution used by plan analysis.
///
/// All methods only count holdings whose asset class is in `enabled`.
pub trait HoldingsValuation {
    /// Total value of the enabled holdings.
    fn total_value(&self, enabled: &[AssetClass]) -> f64;

    /// Percentage of the total per risk category (every category present).
    fn risk_category_distribution(&self, enabled: &[AssetClass]) -> HashMap<RiskCategory, f64>;

    /// Percentage of the total per enabled asset class.
    fn asset_class_distribution(&self, enabled: &[AssetClass]) -> HashMap<AssetClass, f64>;
}

/// Manages the holdings list and values it.
///
/// Pure business logic: no I/O, no API calls.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Add a holding. If a holding with the same code and asset class already
    /// exists, the amount is added to it instead. Returns the id of the
    /// holding that now carries the amount.
    pub fn add_holding(&self, holdings: &mut Vec<Holding>, holding: Holding) -> Result<Uuid, CoreError> {
        Self::validate(&holding)?;

        if let Some(existing) = holdings.iter_mut().find(|h| h.same_asset(&holding)) {
            existing.amount += holding.amount;
            info!(
                code = %existing.code,
                added = holding.amount,
                total = existing.amount,
                "merged into existing holding"
            );
            return Ok(existing.id);
        }

        info!(code = %holding.code, amount = holding.amount, "added holding");
        let id = holding.id;
        holdings.push(holding);
        Ok(id)
    }

    /// Replace the holding with the same id.
    pub fn update_holding(&self, holdings: &mut [Holding], holding: Holding) -> Result<(), CoreError> {
        Self::validate(&holding)?;
        let slot = holdings
            .iter_mut()
            .find(|h| h.id == holding.id)
            .ok_or_else(|| CoreError::HoldingNotFound(holding.id.to_string()))?;
        *slot = holding;
        Ok(())
    }

    /// Remove a holding by id and hand it back.
    pub fn remove_holding(&self, holdings: &mut Vec<Holding>, id: Uuid) -> Result<Holding, CoreError> {
        let idx = holdings
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))?;
        Ok(holdings.remove(idx))
    }

    /// Holdings of one class; empty when the class is disabled.
    pub fn holdings_for_class<'a>(
        &self,
        holdings: &'a [Holding],
        asset_class: AssetClass,
        enabled: &[AssetClass],
    ) -> Vec<&'a Holding> {
        if !enabled.contains(&asset_class) {
            return Vec::new();
        }
        holdings.iter().filter(|h| h.asset_class == asset_class).collect()
    }

    /// Holdings in one risk category, restricted to enabled classes.
    pub fn holdings_for_category<'a>(
        &self,
        holdings: &'a [Holding],
        category: RiskCategory,
        enabled: &[AssetClass],
    ) -> Vec<&'a Holding> {
        holdings
            .iter()
            .filter(|h| h.category == category && enabled.contains(&h.asset_class))
            .collect()
    }

    pub fn sum_for_class(&self, holdings: &[Holding], asset_class: AssetClass, enabled: &[AssetClass]) -> f64 {
        self.holdings_for_class(holdings, asset_class, enabled)
            .iter()
            .map(|h| h.value())
            .sum()
    }

    pub fn sum_for_category(&self, holdings: &[Holding], category: RiskCategory, enabled: &[AssetClass]) -> f64 {
        self.holdings_for_category(holdings, category, enabled)
            .iter()
            .map(|h| h.value())
            .sum()
    }

    /// Sum of all enabled holdings.
    pub fn total_value(&self, holdings: &[Holding], enabled: &[AssetClass]) -> f64 {
        holdings
            .iter()
            .filter(|h| enabled.contains(&h.asset_class))
            .map(Holding::value)
            .sum()
    }

    pub fn percentage_for_class(&self, holdings: &[Holding], asset_class: AssetClass, enabled: &[AssetClass]) -> f64 {
        Self::share(self.sum_for_class(holdings, asset_class, enabled), self.total_value(holdings, enabled))
    }

    pub fn percentage_for_category(
        &self,
        holdings: &[Holding],
        category: RiskCategory,
        enabled: &[AssetClass],
    ) -> f64 {
        Self::share(self.sum_for_category(holdings, category, enabled), self.total_value(holdings, enabled))
    }

    pub fn percentage_for_holding(&self, holdings: &[Holding], holding: &Holding, enabled: &[AssetClass]) -> f64 {
        Self::share(holding.value(), self.total_value(holdings, enabled))
    }

    pub fn asset_class_distribution(&self, holdings: &[Holding], enabled: &[AssetClass]) -> HashMap<AssetClass, f64> {
        let total = self.total_value(holdings, enabled);
        enabled
            .iter()
            .map(|&c| (c, Self::share(self.sum_for_class(holdings, c, enabled), total)))
            .collect()
    }

    pub fn risk_category_distribution(
        &self,
        holdings: &[Holding],
        enabled: &[AssetClass],
    ) -> HashMap<RiskCategory, f64> {
        let total = self.total_value(holdings, enabled);
        RiskCategory::ALL
            .iter()
            .map(|&c| (c, Self::share(self.sum_for_category(holdings, c, enabled), total)))
            .collect()
    }

    /// `part` as a percentage of `total`, 0 for an empty portfolio.
    fn share(part: f64, total: f64) -> f64 {
        if total > 0.0 {
            part / total * 100.0
        } else {
            0.0
        }
    }

    fn validate(holding: &Holding) -> Result<(), CoreError> {
        if holding.code.trim().is_empty() {
            return Err(CoreError::ValidationError("Holding code must not be empty".into()));
        }
        if !holding.amount.is_finite() || holding.amount < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Holding amount must be a non-negative number, got {}",
                holding.amount
            )));
        }
        Ok(())
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldingsValuation for [Holding] {
    fn total_value(&self, enabled: &[AssetClass]) -> f64 {
        HoldingsService.total_value(self, enabled)
    }

    fn risk_category_distribution(&self, enabled: &[AssetClass]) -> HashMap<RiskCategory, f64> {
        HoldingsService.risk_category_distribution(self, enabled)
    }

    fn asset_class_distribution(&self, enabled: &[AssetClass]) -> HashMap<AssetClass, f64> {
        HoldingsService.asset_class_distribution(self, enabled)
    }
}

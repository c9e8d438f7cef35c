pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use models::{
    analysis::PlanAnalysis,
    asset::{AssetClass, Holding, RiskCategory},
    plan::{Plan, PlanTargetType},
    portfolio::Portfolio,
    settings::{Currency, Settings},
};
use providers::registry::PriceProviderRegistry;
use services::{
    holdings_service::HoldingsService,
    plan_service::PlanRegistry,
    price_service::{PriceService, RefreshReport},
};
use std::collections::HashMap;
use storage::{manager::StorageManager, plan_store::PlanStore};
use tracing::info;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the Financial Overview core library.
/// Holds the holdings, settings and plans, and all services needed to operate on them.
///
/// Holdings and settings are saved explicitly through `save_to_bytes` /
/// `save_to_file`; plans are saved to their `PlanStore` after every plan command.
#[must_use]
pub struct FinancialOverview<S: PlanStore> {
    portfolio: Portfolio,
    holdings_service: HoldingsService,
    price_service: PriceService,
    plans: PlanRegistry<S>,
    /// When prices were last refreshed.
    last_updated: Option<DateTime<Utc>>,
    /// Tracks whether holdings or settings changed since the last save/load.
    dirty: bool,
}

impl<S: PlanStore> std::fmt::Debug for FinancialOverview<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinancialOverview")
            .field("holdings", &self.portfolio.holdings.len())
            .field("settings", &self.portfolio.settings)
            .field("plans", &self.plans.plans().len())
            .field("last_updated", &self.last_updated)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl<S: PlanStore> FinancialOverview<S> {
    /// Start with no holdings and default settings. Plans are loaded from `store`.
    pub fn create_new(store: S, providers: PriceProviderRegistry) -> Result<Self, CoreError> {
        Self::with_portfolio(Portfolio::default(), store, providers)
    }

    /// Start from an existing portfolio. Plans are loaded from `store`.
    pub fn with_portfolio(
        portfolio: Portfolio,
        store: S,
        providers: PriceProviderRegistry,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            portfolio,
            holdings_service: HoldingsService::new(),
            price_service: PriceService::new(providers),
            plans: PlanRegistry::open(store)?,
            last_updated: None,
            dirty: false,
        })
    }

    /// Load holdings and settings from bytes produced by `save_to_bytes`.
    pub fn load_from_bytes(
        data: &[u8],
        store: S,
        providers: PriceProviderRegistry,
    ) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_from_bytes(data)?;
        Self::with_portfolio(portfolio, store, providers)
    }

    /// Serialize holdings and settings. Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.portfolio)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load holdings and settings from a file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(
        path: &str,
        store: S,
        providers: PriceProviderRegistry,
    ) -> Result<Self, CoreError> {
        let portfolio = StorageManager::load_from_file(path)?;
        Self::with_portfolio(portfolio, store, providers)
    }

    /// Save holdings and settings to a file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.portfolio, path)?;
        self.dirty = false;
        Ok(())
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Add a holding, merging with an existing one of the same code and class.
    pub fn add_holding(&mut self, holding: Holding) -> Result<Uuid, CoreError> {
        let id = self
            .holdings_service
            .add_holding(&mut self.portfolio.holdings, holding)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn update_holding(&mut self, holding: Holding) -> Result<(), CoreError> {
        self.holdings_service
            .update_holding(&mut self.portfolio.holdings, holding)?;
        self.dirty = true;
        Ok(())
    }

    pub fn remove_holding(&mut self, id: Uuid) -> Result<Holding, CoreError> {
        let removed = self
            .holdings_service
            .remove_holding(&mut self.portfolio.holdings, id)?;
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.portfolio.holdings
    }

    #[must_use]
    pub fn get_holding(&self, id: Uuid) -> Option<&Holding> {
        self.portfolio.holdings.iter().find(|h| h.id == id)
    }

    #[must_use]
    pub fn holdings_for_class(&self, asset_class: AssetClass) -> Vec<&Holding> {
        self.holdings_service
            .holdings_for_class(&self.portfolio.holdings, asset_class, &self.enabled_asset_classes())
    }

    #[must_use]
    pub fn holdings_for_category(&self, category: RiskCategory) -> Vec<&Holding> {
        self.holdings_service
            .holdings_for_category(&self.portfolio.holdings, category, &self.enabled_asset_classes())
    }

    // ── Values ──────────────────────────────────────────────────────

    /// Value of all holdings in enabled asset classes.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.holdings_service
            .total_value(&self.portfolio.holdings, &self.enabled_asset_classes())
    }

    #[must_use]
    pub fn percentage_for_class(&self, asset_class: AssetClass) -> f64 {
        self.holdings_service
            .percentage_for_class(&self.portfolio.holdings, asset_class, &self.enabled_asset_classes())
    }

    #[must_use]
    pub fn percentage_for_category(&self, category: RiskCategory) -> f64 {
        self.holdings_service
            .percentage_for_category(&self.portfolio.holdings, category, &self.enabled_asset_classes())
    }

    #[must_use]
    pub fn percentage_for_holding(&self, holding: &Holding) -> f64 {
        self.holdings_service
            .percentage_for_holding(&self.portfolio.holdings, holding, &self.enabled_asset_classes())
    }

    #[must_use]
    pub fn asset_class_distribution(&self) -> HashMap<AssetClass, f64> {
        self.holdings_service
            .asset_class_distribution(&self.portfolio.holdings, &self.enabled_asset_classes())
    }

    #[must_use]
    pub fn risk_category_distribution(&self) -> HashMap<RiskCategory, f64> {
        self.holdings_service
            .risk_category_distribution(&self.portfolio.holdings, &self.enabled_asset_classes())
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Fetch a fresh price for every holding in the selected currency.
    pub async fn refresh_prices(&mut self) -> RefreshReport {
        let currency = self.portfolio.settings.currency;
        let report = self
            .price_service
            .refresh_prices(&mut self.portfolio.holdings, currency)
            .await;
        info!(
            updated = report.updated,
            unavailable = report.unavailable,
            failed = report.failed,
            "prices refreshed"
        );
        self.last_updated = Some(Utc::now());
        self.dirty = true;
        report
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    #[must_use]
    pub fn is_provider_available(&self, asset_class: AssetClass) -> bool {
        self.price_service.has_provider_for(asset_class)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Change the display currency. Existing prices are in the old currency
    /// until the next `refresh_prices`.
    pub fn set_currency(&mut self, currency: Currency) {
        if self.portfolio.settings.currency != currency {
            self.portfolio.settings.currency = currency;
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn is_asset_class_enabled(&self, asset_class: AssetClass) -> bool {
        self.portfolio.settings.asset_classes.is_enabled(asset_class)
    }

    pub fn set_asset_class_enabled(&mut self, asset_class: AssetClass, enabled: bool) {
        if self.is_asset_class_enabled(asset_class) == enabled {
            return;
        }
        self.portfolio
            .settings
            .asset_classes
            .set_enabled(asset_class, enabled);
        self.dirty = true;
    }

    pub fn toggle_asset_class(&mut self, asset_class: AssetClass) {
        self.portfolio.settings.asset_classes.toggle(asset_class);
        self.dirty = true;
    }

    /// Enabled asset classes in canonical order.
    #[must_use]
    pub fn enabled_asset_classes(&self) -> Vec<AssetClass> {
        self.portfolio.settings.asset_classes.enabled_classes()
    }

    // ── Plans ───────────────────────────────────────────────────────

    #[must_use]
    pub fn plans(&self) -> &[Plan] {
        self.plans.plans()
    }

    /// The store plans are saved to.
    #[must_use]
    pub fn plan_store(&self) -> &S {
        self.plans.store()
    }

    #[must_use]
    pub fn get_plan(&self, id: Uuid) -> Option<&Plan> {
        self.plans.get(id)
    }

    /// Create and store a plan seeded with the current key universe:
    /// all risk categories, or the currently enabled asset classes.
    pub fn create_plan(
        &mut self,
        name: impl Into<String>,
        target_type: PlanTargetType,
    ) -> Result<&Plan, CoreError> {
        let plan = match target_type {
            PlanTargetType::RiskClass => Plan::new_risk_class_plan(name),
            PlanTargetType::AssetClass => {
                Plan::new_asset_class_plan(name, &self.enabled_asset_classes())
            }
        };
        self.plans.create(plan)
    }

    /// Store a plan built by the caller.
    pub fn add_plan(&mut self, plan: Plan) -> Result<&Plan, CoreError> {
        self.plans.create(plan)
    }

    pub fn update_plan(&mut self, plan: Plan) -> Result<&Plan, CoreError> {
        self.plans.update(plan)
    }

    pub fn delete_plan(&mut self, id: Uuid) -> Result<Plan, CoreError> {
        self.plans.delete(id)
    }

    /// Set the target percentage of one category of a stored plan.
    ///
    /// A key the plan does not contain leaves the plan untouched and
    /// nothing is saved.
    pub fn set_plan_distribution(
        &mut self,
        id: Uuid,
        key: &str,
        percentage: f64,
    ) -> Result<&Plan, CoreError> {
        let mut plan = self
            .plans
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::PlanNotFound(id.to_string()))?;

        if plan.upsert_distribution(key, percentage) {
            self.plans.update(plan)
        } else {
            self.plans
                .get(id)
                .ok_or_else(|| CoreError::PlanNotFound(id.to_string()))
        }
    }

    /// Analyze a stored plan against the current holdings and enabled classes.
    pub fn analyze_plan(&self, id: Uuid) -> Result<PlanAnalysis, CoreError> {
        let enabled = self.enabled_asset_classes();
        self.plans
            .analyze_plan_by_id(id, self.portfolio.holdings.as_slice(), &enabled)
    }
}

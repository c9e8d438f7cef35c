use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::asset::{AssetClass, Holding};
use crate::models::settings::Currency;
use crate::providers::registry::PriceProviderRegistry;

/// Outcome of a bulk price refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Holdings that received a price
    pub updated: usize,
    /// Holdings for which every provider answered without a quote
    pub unavailable: usize,
    /// Holdings whose lookup failed; their previous price is kept
    pub failed: usize,
}

/// Looks up market prices through the registered providers.
pub struct PriceService {
    registry: PriceProviderRegistry,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one provider is available for a given asset class.
    pub fn has_provider_for(&self, asset_class: AssetClass) -> bool {
        !self.registry.get_providers_for(asset_class).is_empty()
    }

    /// Get the names of all providers available for a given asset class.
    pub fn get_provider_names(&self, asset_class: AssetClass) -> Vec<String> {
        self.registry
            .get_providers_for(asset_class)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Fetch the unit price of `code` with automatic fallback.
    ///
    /// Tries providers in registration order; the first price wins. A
    /// provider answering "no quote" or failing hands over to the next one.
    /// Returns `Ok(None)` if every provider answered without a quote, and the
    /// last error if at least one failed and none had a price.
    pub async fn fetch_price(
        &self,
        code: &str,
        asset_class: AssetClass,
        currency: Currency,
    ) -> Result<Option<f64>, CoreError> {
        let providers = self.registry.get_providers_for(asset_class);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(asset_class.to_string()));
        }

        let mut last_error = None;

        for provider in &providers {
            match provider.fetch_price(code, currency).await {
                Ok(Some(price)) => {
                    if !price.is_finite() || price < 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {code}: {price} (must be finite and non-negative)"
                            ),
                        });
                        continue;
                    }
                    return Ok(Some(price));
                }
                Ok(None) => {
                    debug!(provider = provider.name(), code, "no quote");
                }
                Err(e) => {
                    debug!(provider = provider.name(), code, error = %e, "provider failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// Refresh `current_price` of every holding.
    ///
    /// A holding without a quote gets its price cleared; a failed lookup
    /// leaves the previous price untouched.
    pub async fn refresh_prices(&self, holdings: &mut [Holding], currency: Currency) -> RefreshReport {
        let mut report = RefreshReport::default();

        for holding in holdings.iter_mut() {
            match self.fetch_price(&holding.code, holding.asset_class, currency).await {
                Ok(Some(price)) => {
                    holding.current_price = Some(price);
                    report.updated += 1;
                }
                Ok(None) => {
                    holding.current_price = None;
                    report.unavailable += 1;
                }
                Err(e) => {
                    warn!(code = %holding.code, name = %holding.name, error = %e, "error fetching price");
                    report.failed += 1;
                }
            }
        }

        report
    }
}

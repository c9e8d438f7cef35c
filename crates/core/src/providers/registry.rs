use crate::models::asset::AssetClass;

use super::traits::PriceProvider;

/// Registry of available price providers.
///
/// Routes lookups to providers by `AssetClass`, in registration order.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Register a new price provider. Earlier registrations take priority.
    pub fn register(&mut self, provider: Box<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Return all providers that support the given class, ordered by priority.
    /// Used for fallback: if the first provider fails, the next one is tried.
    pub fn get_providers_for(&self, asset_class: AssetClass) -> Vec<&dyn PriceProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_asset_classes().contains(&asset_class))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

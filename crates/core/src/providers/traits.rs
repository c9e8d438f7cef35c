use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset::AssetClass;
use crate::models::settings::Currency;

/// Trait abstraction for market price sources.
///
/// Fetching and parsing third-party feeds happens behind this trait; the
/// core only ever sees a price, the absence of one, or an error.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset classes this provider can price.
    fn supported_asset_classes(&self) -> Vec<AssetClass>;

    /// Latest unit price of `code` in `currency`.
    ///
    /// `Ok(None)` means the provider answered but has no quote for the code.
    async fn fetch_price(&self, code: &str, currency: Currency) -> Result<Option<f64>, CoreError>;
}

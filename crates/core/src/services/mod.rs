pub mod holdings_service;
pub mod plan_service;
pub mod price_service;
pub mod rebalancing_service;

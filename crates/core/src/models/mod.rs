pub mod analysis;
pub mod asset;
pub mod plan;
pub mod portfolio;
pub mod settings;

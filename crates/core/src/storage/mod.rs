pub mod format;
pub mod manager;
pub mod plan_store;

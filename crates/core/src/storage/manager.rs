use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;

use super::format;

/// High-level storage operations: save/load the portfolio to/from bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a portfolio to raw bytes (portable, platform-independent).
    ///
    /// Flow: Portfolio → JSON → versioned envelope bytes
    pub fn save_to_bytes(portfolio: &Portfolio) -> Result<Vec<u8>, CoreError> {
        format::write_document(portfolio)
    }

    /// Deserialize a portfolio from raw bytes.
    pub fn load_from_bytes(data: &[u8]) -> Result<Portfolio, CoreError> {
        format::read_document(data)
    }

    /// Save portfolio to a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(portfolio: &Portfolio, path: &str) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(portfolio)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Load portfolio from a file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str) -> Result<Portfolio, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }
}

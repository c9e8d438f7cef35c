use thiserror::Error;

/// Unified error type for the entire financial-overview-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Persistence ─────────────────────────────────────────────────
    /// Saving the plan list failed. The in-memory state is kept as-is.
    #[error("Persistence error: {0}")]
    Persistence(String),

    // ── Price lookup ────────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("No provider available for asset class: {0}")]
    NoProvider(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Holding not found: {0}")]
    HoldingNotFound(String),

    #[error("Unknown category key: {0}")]
    UnknownCategory(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            CoreError::FileIO(e.to_string())
        } else {
            CoreError::Deserialization(e.to_string())
        }
    }
}

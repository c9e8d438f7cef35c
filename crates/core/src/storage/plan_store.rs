use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::CoreError;
use crate::models::plan::Plan;

use super::format;

/// Persistence collaborator for the plan list.
///
/// The whole list is written on every save; there are no partial updates.
pub trait PlanStore: Send + Sync {
    fn load_plans(&self) -> Result<Vec<Plan>, CoreError>;

    fn save_plans(&self, plans: &[Plan]) -> Result<(), CoreError>;
}

/// Keeps the last saved list in memory.
#[derive(Debug, Default)]
pub struct MemoryPlanStore {
    plans: Mutex<Vec<Plan>>,
    saves: AtomicUsize,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-saved list.
    pub fn with_plans(plans: Vec<Plan>) -> Self {
        Self {
            plans: Mutex::new(plans),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl PlanStore for MemoryPlanStore {
    fn load_plans(&self) -> Result<Vec<Plan>, CoreError> {
        let plans = self
            .plans
            .lock()
            .map_err(|_| CoreError::Persistence("plan store lock poisoned".into()))?;
        Ok(plans.clone())
    }

    fn save_plans(&self, plans: &[Plan]) -> Result<(), CoreError> {
        let mut stored = self
            .plans
            .lock()
            .map_err(|_| CoreError::Persistence("plan store lock poisoned".into()))?;
        *stored = plans.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Stores the plan list as a versioned JSON document on disk (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct JsonFilePlanStore {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl JsonFilePlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PlanStore for JsonFilePlanStore {
    /// A missing file is an empty list.
    fn load_plans(&self) -> Result<Vec<Plan>, CoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => format::read_document(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling `<file name>.tmp` first, then renames over the target.
    fn save_plans(&self, plans: &[Plan]) -> Result<(), CoreError> {
        let bytes = format::write_document(&plans)?;
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::batch::{self, BatchError, BatchResult, Point, TransformRow};
use crate::params::{ParameterSet, ParameterStore, StoreResult};
use crate::registry::{FrameCode, FrameRegistry};
use crate::route::{self, ResolveResult, TransformPath};

/// Long-lived transformation context: the parameter store and the frame
/// registry derived from it, loaded once and read-only afterwards.
///
/// Requests share the engine freely; per-request state lives entirely in
/// the arguments and return values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransformEngine {
    store: ParameterStore,
    registry: FrameRegistry,
}

impl TransformEngine {
    pub fn from_set(set: ParameterSet) -> StoreResult<TransformEngine> {
        let store = ParameterStore::from_set(set)?;
        Ok(Self::from_store(store))
    }

    pub fn from_yaml(yaml: &str) -> StoreResult<TransformEngine> {
        Ok(Self::from_store(ParameterStore::from_yaml(yaml)?))
    }

    pub fn from_file(path: &str) -> StoreResult<TransformEngine> {
        let store = ParameterStore::from_file(path)?;
        info!(path, "transform engine initialized");
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: ParameterStore) -> TransformEngine {
        let registry = store.registry();
        TransformEngine { store, registry }
    }

    pub fn registry(&self) -> &FrameRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// Resolves an ordered Helmert step list from `source` to `target`.
    pub fn resolve_path(&self, source: &str, target: &str) -> ResolveResult<TransformPath> {
        let path = route::resolve(
            &self.store,
            &self.registry,
            &FrameCode::from(source),
            &FrameCode::from(target),
        )?;
        debug!(path = %path.describe(), "path resolved");
        Ok(path)
    }

    /// Fail-fast table transformation; the first invalid row aborts.
    pub fn transform_table(
        &self,
        path: &TransformPath,
        table: &[Point],
    ) -> Result<Vec<TransformRow>, BatchError> {
        batch::transform_table(path, table)
    }

    /// Per-row result union; invalid rows do not discard valid ones.
    pub fn transform_rows(&self, path: &TransformPath, table: &[Point]) -> BatchResult {
        batch::transform_rows(path, table)
    }
}

use serde::{Deserialize, Serialize};

/// Lifecycle of the module slot in the render context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderState {
    #[default]
    Unloaded,
    /// Bytes received; instantiation in flight on the loader worker.
    Loading,
    /// A module is adopted and stepped every quantum.
    Ready,
}

impl RenderState {
    pub fn is_ready(self) -> bool {
        self == RenderState::Ready
    }
}

/// Counters kept by the render context. Plain integers, so reading them
/// from the owner never touches a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderStats {
    /// Every call to `process`.
    pub quanta: u64,
    /// Quanta rendered as silence because no module was ready.
    pub silent_quanta: u64,
    /// Quanta rendered as silence because the module failed or panicked.
    pub failed_quanta: u64,
    /// Load requests that could not be forwarded to the loader.
    pub dropped_loads: u64,
}

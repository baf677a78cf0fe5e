//! The render side of the harness.
//!
//! [`StreamProcessor`] is driven once per render quantum by an external
//! clock. It never blocks and never allocates: module bytes are forwarded to
//! a [`LoaderWorker`] on the control side, which instantiates them and hands
//! a [`PreparedModule`] back to be adopted at the next quantum boundary.

pub mod loader;
pub mod processor;
pub mod render_state;


pub use loader::{LoadError, LoaderWorker, ModuleLoader, PreparedModule};
pub use processor::StreamProcessor;
pub use render_state::{RenderState, RenderStats};

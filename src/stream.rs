//! Compiled stream modules as seen by the runtime.
//!
//! A module owns a flat memory region. The render context asks it to step
//! the current continuation, which writes one quantum of little-endian `f32`
//! samples at a pointer into that memory and hands back the successor
//! continuation.

pub mod module;
pub mod native;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use module::{CompiledModule, ModuleError, ModulePtr, StreamHandle, read_samples};
pub use native::{Constant, NativeModule, NativeStream, Sine};

use thiserror::Error;

use crate::constants::SAMPLE_SIZE;

/// Byte offset into a module's memory.
pub type ModulePtr = u32;

/// Opaque reference to "the rest of the stream". Only the module that
/// produced it knows what it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    #[error("module does not export `{0}`")]
    MissingExport(String),
    #[error("export `{name}` has the wrong type: {detail}")]
    BadExport { name: String, detail: String },
    #[error("module trapped: {0}")]
    Trap(String),
    #[error("{len} bytes at {ptr:#x} fall outside a memory of {memory} bytes")]
    OutOfBounds { ptr: ModulePtr, len: usize, memory: usize },
    #[error("cannot allocate {size} bytes")]
    Alloc { size: usize },
    #[error("continuation {0:?} is not live in this module")]
    StaleHandle(StreamHandle),
    #[error("stream failed: {0}")]
    Step(String),
}

/// The interface a compiled stream exposes to the runtime.
///
/// `alloc` and `entry` run once, off the render path. `step` runs once per
/// render quantum and must not block.
pub trait CompiledModule: Send {
    fn memory(&self) -> &[u8];

    fn alloc(&mut self, size: usize) -> Result<ModulePtr, ModuleError>;

    /// The continuation the stream starts from.
    fn entry(&mut self) -> Result<StreamHandle, ModuleError>;

    /// Writes `quantum` samples at `out` and returns the successor of `handle`.
    fn step(
        &mut self,
        handle: StreamHandle,
        quantum: usize,
        out: ModulePtr,
    ) -> Result<StreamHandle, ModuleError>;
}

/// Decodes `out.len()` samples starting at `ptr`.
pub fn read_samples(memory: &[u8], ptr: ModulePtr, out: &mut [f32]) -> Result<(), ModuleError> {
    let start = ptr as usize;
    let len = out.len() * SAMPLE_SIZE;
    let bytes = start
        .checked_add(len)
        .and_then(|end| memory.get(start..end))
        .ok_or(ModuleError::OutOfBounds { ptr, len, memory: memory.len() })?;

    for (sample, chunk) in out.iter_mut().zip(bytes.chunks_exact(SAMPLE_SIZE)) {
        *sample = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_samples() {
        let mut memory = vec![0u8; 16];
        memory[4..8].copy_from_slice(&0.5f32.to_le_bytes());
        memory[8..12].copy_from_slice(&(-1.0f32).to_le_bytes());

        let mut out = [9.0; 2];
        read_samples(&memory, 4, &mut out).unwrap();
        assert_eq!(out, [0.5, -1.0]);
    }

    #[test]
    fn test_read_samples_out_of_bounds() {
        let memory = vec![0u8; 16];
        let mut out = [0.0; 4];
        assert_eq!(
            read_samples(&memory, 4, &mut out),
            Err(ModuleError::OutOfBounds { ptr: 4, len: 16, memory: 16 })
        );
        assert!(read_samples(&memory, u32::MAX, &mut out).is_err());
    }
}

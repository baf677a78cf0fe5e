//! Streams implemented in Rust, wrapped so the runtime drives them exactly
//! like compiled modules: samples go through module memory and every step
//! hands out a fresh continuation.

use std::f32::consts::TAU;

use super::module::{CompiledModule, ModuleError, ModulePtr, StreamHandle};
use crate::constants::SAMPLE_SIZE;

/// A stream that keeps its continuation as in-place state.
pub trait NativeStream: Send {
    /// Produces the next `out.len()` samples and advances.
    fn step(&mut self, out: &mut [f32]) -> Result<(), ModuleError>;
}

impl<F> NativeStream for F
where
    F: FnMut(&mut [f32]) -> Result<(), ModuleError> + Send,
{
    fn step(&mut self, out: &mut [f32]) -> Result<(), ModuleError> {
        self(out)
    }
}

/// `&s. v :: s`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f32);

impl NativeStream for Constant {
    fn step(&mut self, out: &mut [f32]) -> Result<(), ModuleError> {
        out.fill(self.0);
        Ok(())
    }
}

/// `(&s. \x. sin x :: !s (add x step)) 0.`
#[derive(Debug, Clone, PartialEq)]
pub struct Sine {
    pub frequency: f32,
    pub sample_rate: u32,
    phase: f32,
}

impl Sine {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Sine { frequency, sample_rate, phase: 0.0 }
    }

    fn increment(&self) -> f32 {
        TAU * self.frequency / self.sample_rate as f32
    }
}

impl NativeStream for Sine {
    fn step(&mut self, out: &mut [f32]) -> Result<(), ModuleError> {
        let increment = self.increment();
        for sample in out.iter_mut() {
            *sample = self.phase.sin();
            self.phase = (self.phase + increment) % TAU;
        }
        Ok(())
    }
}

const NULL_GUARD: usize = 8;

/// Adapts a [`NativeStream`] to [`CompiledModule`].
///
/// Only the most recently returned handle is live; stepping an older one is
/// an error, since the stream state has already moved past it.
pub struct NativeModule<S> {
    stream: S,
    memory: Vec<u8>,
    frames: Vec<f32>,
    live: StreamHandle,
}

impl<S: NativeStream> NativeModule<S> {
    pub fn new(stream: S) -> Self {
        NativeModule {
            stream,
            memory: vec![0; NULL_GUARD],
            frames: Vec::new(),
            live: StreamHandle(0),
        }
    }
}

impl<S: NativeStream> CompiledModule for NativeModule<S> {
    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn alloc(&mut self, size: usize) -> Result<ModulePtr, ModuleError> {
        let start = self.memory.len().next_multiple_of(SAMPLE_SIZE);
        let end = start.checked_add(size).ok_or(ModuleError::Alloc { size })?;
        let ptr = ModulePtr::try_from(start).map_err(|_| ModuleError::Alloc { size })?;
        ModulePtr::try_from(end).map_err(|_| ModuleError::Alloc { size })?;

        self.memory.resize(end, 0);
        let frames = size / SAMPLE_SIZE;
        if frames > self.frames.len() {
            self.frames.resize(frames, 0.0);
        }
        Ok(ptr)
    }

    fn entry(&mut self) -> Result<StreamHandle, ModuleError> {
        Ok(self.live)
    }

    fn step(
        &mut self,
        handle: StreamHandle,
        quantum: usize,
        out: ModulePtr,
    ) -> Result<StreamHandle, ModuleError> {
        if handle != self.live {
            return Err(ModuleError::StaleHandle(handle));
        }
        let len = quantum * SAMPLE_SIZE;
        let start = out as usize;
        let memory_len = self.memory.len();
        let target = start
            .checked_add(len)
            .and_then(|end| self.memory.get_mut(start..end))
            .ok_or(ModuleError::OutOfBounds { ptr: out, len, memory: memory_len })?;
        let frames = self
            .frames
            .get_mut(..quantum)
            .ok_or(ModuleError::OutOfBounds { ptr: out, len, memory: memory_len })?;

        self.stream.step(frames)?;
        for (chunk, sample) in target.chunks_exact_mut(SAMPLE_SIZE).zip(frames.iter()) {
            chunk.copy_from_slice(&sample.to_le_bytes());
        }

        self.live = StreamHandle(self.live.0.wrapping_add(1));
        Ok(self.live)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::read_samples;

    #[test]
    fn test_constant_through_memory() {
        let mut module = NativeModule::new(Constant(0.25));
        let ptr = module.alloc(4 * SAMPLE_SIZE).unwrap();
        assert!(ptr as usize >= NULL_GUARD);

        let entry = module.entry().unwrap();
        let next = module.step(entry, 4, ptr).unwrap();
        assert_ne!(next, entry);

        let mut out = [0.0; 4];
        read_samples(module.memory(), ptr, &mut out).unwrap();
        assert_eq!(out, [0.25; 4]);
    }

    #[test]
    fn test_old_handles_are_stale() {
        let mut module = NativeModule::new(Constant(1.0));
        let ptr = module.alloc(8).unwrap();
        let entry = module.entry().unwrap();
        let next = module.step(entry, 2, ptr).unwrap();

        assert_eq!(module.step(entry, 2, ptr), Err(ModuleError::StaleHandle(entry)));
        assert!(module.step(next, 2, ptr).is_ok());
    }

    #[test]
    fn test_step_past_scratch_is_rejected() {
        let mut module = NativeModule::new(Constant(1.0));
        let ptr = module.alloc(8).unwrap();
        let entry = module.entry().unwrap();
        assert!(matches!(module.step(entry, 3, ptr), Err(ModuleError::OutOfBounds { .. })));
        // A failed step leaves the continuation live.
        assert!(module.step(entry, 2, ptr).is_ok());
    }

    #[test]
    fn test_sine_continues_across_quanta() {
        let mut whole = Sine::new(440.0, 48000);
        let mut reference = [0.0; 8];
        whole.step(&mut reference).unwrap();

        let mut split = Sine::new(440.0, 48000);
        let mut first = [0.0; 4];
        let mut second = [0.0; 4];
        split.step(&mut first).unwrap();
        split.step(&mut second).unwrap();

        assert_eq!(reference[..4], first);
        for (a, b) in reference[4..].iter().zip(second.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
        assert_eq!(reference[0], 0.0);
    }

    #[test]
    fn test_closure_streams() {
        let mut count = 0.0;
        let mut module = NativeModule::new(move |out: &mut [f32]| -> Result<(), ModuleError> {
            count += 1.0;
            out.fill(count);
            Ok(())
        });
        let ptr = module.alloc(4).unwrap();
        let h = module.entry().unwrap();
        let h = module.step(h, 1, ptr).unwrap();
        module.step(h, 1, ptr).unwrap();

        let mut out = [0.0];
        read_samples(module.memory(), ptr, &mut out).unwrap();
        assert_eq!(out, [2.0]);
    }
}

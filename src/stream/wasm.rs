//! WebAssembly stream modules, run with `wasmi`.
//!
//! Expected exports:
//! - `memory`
//! - `alloc(size: i32) -> i32`
//! - global `main: i32`, the entry continuation
//! - `sample_scheduler(stream: i32, quantum: i32, out: i32) -> i32`

use wasmi::{Engine, Linker, Memory, Module, Store, TypedFunc, Val};

use super::module::{CompiledModule, ModuleError, ModulePtr, StreamHandle};
use crate::schedule::loader::{LoadError, ModuleLoader};

const MEMORY: &str = "memory";
const ALLOC: &str = "alloc";
const ENTRY: &str = "main";
const STEP: &str = "sample_scheduler";

pub struct WasmModule {
    store: Store<()>,
    memory: Memory,
    alloc: TypedFunc<i32, i32>,
    step: TypedFunc<(i32, i32, i32), i32>,
    entry: StreamHandle,
}

fn bad_export(name: &str, err: impl ToString) -> ModuleError {
    ModuleError::BadExport { name: name.to_string(), detail: err.to_string() }
}

fn trap(err: wasmi::Error) -> ModuleError {
    ModuleError::Trap(err.to_string())
}

fn to_i32(value: usize) -> Result<i32, ModuleError> {
    i32::try_from(value).map_err(|_| ModuleError::Alloc { size: value })
}

impl WasmModule {
    pub fn instantiate(bytes: &[u8]) -> Result<Self, LoadError> {
        let engine = Engine::default();
        let module = Module::new(&engine, bytes).map_err(|e| LoadError::Malformed(e.to_string()))?;
        let mut store = Store::new(&engine, ());
        let linker = <Linker<()>>::new(&engine);
        let instance = linker
            .instantiate(&mut store, &module)
            .and_then(|pre| pre.start(&mut store))
            .map_err(|e| LoadError::Malformed(e.to_string()))?;

        let memory = instance
            .get_memory(&store, MEMORY)
            .ok_or_else(|| ModuleError::MissingExport(MEMORY.into()))?;
        let alloc = instance
            .get_typed_func::<i32, i32>(&store, ALLOC)
            .map_err(|e| bad_export(ALLOC, e))?;
        let step = instance
            .get_typed_func::<(i32, i32, i32), i32>(&store, STEP)
            .map_err(|e| bad_export(STEP, e))?;
        let entry = match instance
            .get_global(&store, ENTRY)
            .ok_or_else(|| ModuleError::MissingExport(ENTRY.into()))?
            .get(&store)
        {
            Val::I32(v) => StreamHandle(v as u32 as u64),
            other => return Err(bad_export(ENTRY, format!("expected i32, found {:?}", other.ty())).into()),
        };

        Ok(WasmModule { store, memory, alloc, step, entry })
    }
}

impl CompiledModule for WasmModule {
    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn alloc(&mut self, size: usize) -> Result<ModulePtr, ModuleError> {
        let ptr = self.alloc.call(&mut self.store, to_i32(size)?).map_err(trap)?;
        Ok(ptr as u32)
    }

    fn entry(&mut self) -> Result<StreamHandle, ModuleError> {
        Ok(self.entry)
    }

    fn step(
        &mut self,
        handle: StreamHandle,
        quantum: usize,
        out: ModulePtr,
    ) -> Result<StreamHandle, ModuleError> {
        let stream = u32::try_from(handle.0).map_err(|_| ModuleError::StaleHandle(handle))? as i32;
        let next = self
            .step
            .call(&mut self.store, (stream, to_i32(quantum)?, out as i32))
            .map_err(trap)?;
        Ok(StreamHandle(next as u32 as u64))
    }
}

/// Loads modules from raw `.wasm` bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct WasmLoader;

impl ModuleLoader for WasmLoader {
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn CompiledModule>, LoadError> {
        Ok(Box::new(WasmModule::instantiate(bytes)?))
    }
}

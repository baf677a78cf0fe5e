use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use thiserror::Error;
use thread_priority::ThreadBuilder;
use tracing::{debug, info, warn};

use crate::constants::LOADER_POLL_INTERVAL_MS;
use crate::protocol::message::{LoadOutcome, LoadReport, LoaderRequest};
use crate::stream::{CompiledModule, ModuleError, ModulePtr, StreamHandle};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("malformed module: {0}")]
    Malformed(String),
    #[error(transparent)]
    Module(#[from] ModuleError),
}

/// Turns module bytes into a runnable module.
pub trait ModuleLoader: Send {
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn CompiledModule>, LoadError>;
}

impl<F> ModuleLoader for F
where
    F: Fn(&[u8]) -> Result<Box<dyn CompiledModule>, LoadError> + Send,
{
    fn load(&self, bytes: &[u8]) -> Result<Box<dyn CompiledModule>, LoadError> {
        self(bytes)
    }
}

/// An instantiated module with its scratch buffer and entry continuation,
/// ready to be adopted by the render context as is.
pub struct PreparedModule {
    pub generation: u64,
    pub module: Box<dyn CompiledModule>,
    pub scratch: ModulePtr,
    pub entry: StreamHandle,
}

impl std::fmt::Debug for PreparedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedModule")
            .field("generation", &self.generation)
            .field("scratch", &self.scratch)
            .field("entry", &self.entry)
            .finish_non_exhaustive()
    }
}

/// Control-side worker doing everything the render context must not:
/// instantiation, scratch allocation, and dropping retired modules.
pub struct LoaderWorker<L> {
    loader: L,
    scratch_bytes: usize,
    requests: Receiver<LoaderRequest>,
    outcomes: Sender<LoadOutcome>,
    reports: Sender<LoadReport>,
}

impl<L: ModuleLoader> LoaderWorker<L> {
    pub fn new(
        loader: L,
        scratch_bytes: usize,
        requests: Receiver<LoaderRequest>,
        outcomes: Sender<LoadOutcome>,
        reports: Sender<LoadReport>,
    ) -> Self {
        LoaderWorker { loader, scratch_bytes, requests, outcomes, reports }
    }

    fn prepare(&self, generation: u64, bytes: &[u8]) -> Result<PreparedModule, LoadError> {
        let mut module = self.loader.load(bytes)?;
        let scratch = module.alloc(self.scratch_bytes)?;
        let entry = module.entry()?;
        Ok(PreparedModule { generation, module, scratch, entry })
    }

    pub fn handle(&self, request: LoaderRequest) {
        match request {
            LoaderRequest::Instantiate { generation, module_bytes } => {
                debug!(generation, bytes = module_bytes.len(), "instantiating module");
                let outcome = match self.prepare(generation, &module_bytes) {
                    Ok(prepared) => {
                        info!(generation, "module instantiated");
                        LoadOutcome::Loaded(prepared)
                    }
                    Err(error) => {
                        warn!(generation, %error, "module instantiation failed");
                        let _ = self.reports.try_send(LoadReport::Failed { generation, error });
                        LoadOutcome::Failed { generation }
                    }
                };
                if self.outcomes.send(outcome).is_err() {
                    debug!(generation, "render context gone, dropping load outcome");
                }
            }
            LoaderRequest::Retire(module) => {
                debug!("dropping retired module");
                drop(module);
            }
        }
    }

    /// Handles every request already queued. Returns how many there were.
    pub fn run_pending(&self) -> usize {
        let mut handled = 0;
        loop {
            match self.requests.try_recv() {
                Ok(request) => {
                    self.handle(request);
                    handled += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return handled,
            }
        }
    }

    /// Serves requests until the render context hangs up.
    pub fn run(&self) {
        let interval = Duration::from_millis(LOADER_POLL_INTERVAL_MS);
        loop {
            match self.requests.recv_timeout(interval) {
                Ok(request) => self.handle(request),
                Err(RecvTimeoutError::Timeout) => (),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("loader worker exiting");
    }
}

impl<L: ModuleLoader + 'static> LoaderWorker<L> {
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        ThreadBuilder::default()
            .name("lambdalisten-loader")
            .spawn(move |_| self.run())
    }
}

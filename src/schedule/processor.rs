use std::panic::{AssertUnwindSafe, catch_unwind};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use super::loader::PreparedModule;
use super::render_state::{RenderState, RenderStats};
use crate::protocol::message::{ControlMessage, LoadOutcome, LoaderRequest, RenderMessage};
use crate::stream::{CompiledModule, ModulePtr, StreamHandle, read_samples};

/// An adopted module and the continuation it will be stepped from next.
struct ActiveModule {
    module: Box<dyn CompiledModule>,
    scratch: ModulePtr,
    current: StreamHandle,
}

impl From<PreparedModule> for ActiveModule {
    fn from(prepared: PreparedModule) -> Self {
        ActiveModule {
            module: prepared.module,
            scratch: prepared.scratch,
            current: prepared.entry,
        }
    }
}

enum StepResult {
    Rendered,
    Failed,
}

/// The per-quantum trampoline owned by the render context.
///
/// Messages are only looked at on quantum boundaries, so a step is never
/// interrupted by a replacement. Once a newer load has been received the
/// previous module is never stepped again: it is parked until the new one
/// is adopted, and restored only if the new one fails to instantiate.
pub struct StreamProcessor {
    quantum_size: usize,
    state: RenderState,
    active: Option<ActiveModule>,
    parked: Option<ActiveModule>,
    generation: u64,
    pending_ack: bool,
    stats: RenderStats,

    control_rx: Receiver<ControlMessage>,
    loader_tx: Sender<LoaderRequest>,
    loaded_rx: Receiver<LoadOutcome>,
    events_tx: Sender<RenderMessage>,
}

impl StreamProcessor {
    pub(crate) fn new(
        quantum_size: usize,
        control_rx: Receiver<ControlMessage>,
        loader_tx: Sender<LoaderRequest>,
        loaded_rx: Receiver<LoadOutcome>,
        events_tx: Sender<RenderMessage>,
    ) -> Self {
        StreamProcessor {
            quantum_size,
            state: RenderState::Unloaded,
            active: None,
            parked: None,
            generation: 0,
            pending_ack: false,
            stats: RenderStats::default(),
            control_rx,
            loader_tx,
            loaded_rx,
            events_tx,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn quantum_size(&self) -> usize {
        self.quantum_size
    }

    /// Generation of the last load received; 0 before any.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Renders one quantum into every channel of `outputs`.
    ///
    /// Channels longer than the quantum get zeros past it; channels shorter
    /// than it get a truncated copy. Every channel receives the same
    /// samples.
    pub fn process<C: AsMut<[f32]>>(&mut self, outputs: &mut [C]) {
        self.stats.quanta += 1;

        while let Ok(message) = self.control_rx.try_recv() {
            self.receive(message);
        }
        while let Ok(outcome) = self.loaded_rx.try_recv() {
            self.adopt(outcome);
        }

        if !self.state.is_ready() {
            self.stats.silent_quanta += 1;
            silence(outputs);
            return;
        }

        if self.pending_ack {
            match self.events_tx.try_send(RenderMessage::Ready) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => self.pending_ack = false,
                Err(TrySendError::Full(_)) => (),
            }
        }

        match self.render(outputs) {
            StepResult::Rendered => (),
            StepResult::Failed => {
                self.stats.failed_quanta += 1;
                silence(outputs);
            }
        }
    }

    fn receive(&mut self, message: ControlMessage) {
        let ControlMessage::LoadModule { module_bytes } = message;
        self.generation += 1;

        if let Some(active) = self.active.take() {
            // Only one parked module at a time: the last one that was Ready.
            if let Some(stale) = self.parked.replace(active) {
                self.retire(stale.module);
            }
        }
        self.state = RenderState::Loading;
        self.pending_ack = false;

        let request = LoaderRequest::Instantiate { generation: self.generation, module_bytes };
        if self.loader_tx.try_send(request).is_err() {
            self.stats.dropped_loads += 1;
            self.restore_parked();
        }
    }

    fn adopt(&mut self, outcome: LoadOutcome) {
        let current = outcome.generation() == self.generation && self.state == RenderState::Loading;
        match outcome {
            LoadOutcome::Loaded(prepared) if current => {
                if let Some(previous) = self.parked.take() {
                    self.retire(previous.module);
                }
                self.active = Some(prepared.into());
                self.state = RenderState::Ready;
                self.pending_ack = true;
            }
            LoadOutcome::Loaded(prepared) => self.retire(prepared.module),
            LoadOutcome::Failed { .. } if current => self.restore_parked(),
            LoadOutcome::Failed { .. } => (),
        }
    }

    /// Falls back to the last Ready module, without a new acknowledgment.
    fn restore_parked(&mut self) {
        match self.parked.take() {
            Some(previous) => {
                self.active = Some(previous);
                self.state = RenderState::Ready;
            }
            None => self.state = RenderState::Unloaded,
        }
    }

    fn retire(&mut self, module: Box<dyn CompiledModule>) {
        // When the worker is saturated or gone the module is dropped here.
        let _ = self.loader_tx.try_send(LoaderRequest::Retire(module));
    }

    fn render<C: AsMut<[f32]>>(&mut self, outputs: &mut [C]) -> StepResult {
        let Some(active) = self.active.as_mut() else {
            return StepResult::Failed;
        };
        let quantum = self.quantum_size;

        let stepped = catch_unwind(AssertUnwindSafe(|| {
            active.module.step(active.current, quantum, active.scratch)
        }));
        let next = match stepped {
            Ok(Ok(next)) => next,
            Ok(Err(_)) | Err(_) => return StepResult::Failed,
        };
        active.current = next;

        // Every channel is decoded from module memory on its own.
        let memory = active.module.memory();
        for channel in outputs.iter_mut() {
            let channel = channel.as_mut();
            let n = quantum.min(channel.len());
            if read_samples(memory, active.scratch, &mut channel[..n]).is_err() {
                return StepResult::Failed;
            }
            channel[n..].fill(0.0);
        }
        StepResult::Rendered
    }
}

fn silence<C: AsMut<[f32]>>(outputs: &mut [C]) {
    for channel in outputs {
        channel.as_mut().fill(0.0);
    }
}

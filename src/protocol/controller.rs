use std::time::{Duration, Instant};

use crossbeam_channel::{self, Receiver, Sender, TryRecvError, TrySendError, select};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::schedule::loader::{LoadError, LoaderWorker, ModuleLoader};
use crate::schedule::processor::StreamProcessor;

use super::message::{ControlMessage, LoadReport, RenderMessage};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("render context disconnected")]
    Disconnected,
    #[error("control queue is full")]
    Full,
    #[error("no readiness acknowledgment within {0:?}")]
    Timeout(Duration),
    #[error("load {generation} failed: {error}")]
    LoadFailed { generation: u64, error: LoadError },
}

/// The control-context endpoint: sends module bytes and observes
/// readiness acknowledgments.
pub struct Controller {
    control_tx: Sender<ControlMessage>,
    events_rx: Receiver<RenderMessage>,
    reports_rx: Receiver<LoadReport>,
    sent: u64,
}

/// Wires a controller, a processor and a loader worker together.
///
/// The processor belongs in the render context, the worker in the control
/// context (call [`LoaderWorker::spawn`], or drive it by hand with
/// [`LoaderWorker::run_pending`]).
pub fn link<L: ModuleLoader>(
    config: &RuntimeConfig,
    loader: L,
) -> (Controller, StreamProcessor, LoaderWorker<L>) {
    let (control_tx, control_rx) = crossbeam_channel::bounded(config.control_capacity);
    let (loader_tx, loader_rx) = crossbeam_channel::bounded(config.loader_capacity);
    let (loaded_tx, loaded_rx) = crossbeam_channel::bounded(config.loader_capacity);
    let (events_tx, events_rx) = crossbeam_channel::bounded(config.event_capacity);
    let (reports_tx, reports_rx) = crossbeam_channel::bounded(config.event_capacity);

    let controller = Controller { control_tx, events_rx, reports_rx, sent: 0 };
    let processor =
        StreamProcessor::new(config.quantum_size, control_rx, loader_tx, loaded_rx, events_tx);
    let worker = LoaderWorker::new(loader, config.scratch_bytes(), loader_rx, loaded_tx, reports_tx);
    (controller, processor, worker)
}

impl Controller {
    /// Hands module bytes to the render context. Returns the generation the
    /// render context will assign to this load.
    ///
    /// Acknowledgments not read yet belong to earlier loads and are
    /// discarded, so a later `try_ready`/`wait_ready` only answers for this
    /// one. An earlier module adopted after this call but before the render
    /// context sees this load can still acknowledge; acknowledgments carry no
    /// generation on the wire.
    pub fn load_module(&mut self, module_bytes: Vec<u8>) -> Result<u64, ProtocolError> {
        let stale = self.events_rx.try_iter().count();
        if stale > 0 {
            debug!(stale, "discarding acknowledgments of earlier loads");
        }
        let bytes = module_bytes.len();
        match self.control_tx.try_send(ControlMessage::LoadModule { module_bytes }) {
            Ok(()) => {
                self.sent += 1;
                info!(generation = self.sent, bytes, "module sent to render context");
                Ok(self.sent)
            }
            Err(TrySendError::Full(_)) => Err(ProtocolError::Full),
            Err(TrySendError::Disconnected(_)) => Err(ProtocolError::Disconnected),
        }
    }

    /// Non-blocking check for an acknowledgment. A failure report for the
    /// latest load is returned as an error.
    pub fn try_ready(&self) -> Result<bool, ProtocolError> {
        self.check_reports()?;
        match self.events_rx.try_recv() {
            Ok(RenderMessage::Ready) => Ok(true),
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(ProtocolError::Disconnected),
        }
    }

    /// Blocks until an acknowledgment arrives, the latest load fails, or
    /// `timeout` elapses.
    pub fn wait_ready(&self, timeout: Duration) -> Result<(), ProtocolError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            select! {
                recv(self.events_rx) -> event => match event {
                    Ok(RenderMessage::Ready) => {
                        debug!("render context acknowledged module");
                        return Ok(());
                    }
                    Err(_) => return Err(ProtocolError::Disconnected),
                },
                recv(self.reports_rx) -> report => match report {
                    Ok(report) => self.check_report(report)?,
                    // The worker is gone but the render context may still ack.
                    Err(_) => return self.wait_event(deadline, timeout),
                },
                default(remaining) => {
                    warn!(?timeout, "timed out waiting for readiness");
                    return Err(ProtocolError::Timeout(timeout));
                }
            }
        }
    }

    fn wait_event(&self, deadline: Instant, timeout: Duration) -> Result<(), ProtocolError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.events_rx.recv_timeout(remaining) {
            Ok(RenderMessage::Ready) => Ok(()),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(ProtocolError::Timeout(timeout)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(ProtocolError::Disconnected),
        }
    }

    fn check_reports(&self) -> Result<(), ProtocolError> {
        while let Ok(report) = self.reports_rx.try_recv() {
            self.check_report(report)?;
        }
        Ok(())
    }

    fn check_report(&self, report: LoadReport) -> Result<(), ProtocolError> {
        let LoadReport::Failed { generation, error } = report;
        if generation == self.sent {
            return Err(ProtocolError::LoadFailed { generation, error });
        }
        debug!(generation, "ignoring failure of a superseded load");
        Ok(())
    }
}

//! Messages between the control context and the render context, and the
//! control-side endpoint that sends them.

pub mod controller;
pub mod message;

pub use controller::{Controller, ProtocolError, link};
pub use message::{ControlMessage, LoadOutcome, LoadReport, LoaderRequest, RenderMessage};

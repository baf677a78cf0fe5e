//! lambdalisten: a small guarded-recursive stream calculus and the
//! real-time harness that drives compiled sample streams.
//!
//! The crate has two halves:
//! - [`lang`] turns source text into an [`lang::Expr`] tree.
//! - [`schedule`], [`protocol`] and [`stream`] run an already compiled
//!   stream one render quantum at a time, with module replacement coming
//!   from a separate control context.

pub mod config;
pub mod constants;
pub mod lang;
pub mod logger;
pub mod protocol;
pub mod schedule;
pub mod stream;

#[cfg(feature = "audio")]
pub mod audio;

pub use config::RuntimeConfig;
pub use lang::{Expr, ParseError, Type, parse, parse_type};
pub use protocol::{Controller, link};
pub use schedule::{RenderState, StreamProcessor};

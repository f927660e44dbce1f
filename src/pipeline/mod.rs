//! Pipeline core: cancellable scopes, the task controller, and the three stage constructors.
//!
//! Source → (unbuffered channel) → FanOut(N workers) → (unbuffered channel) → Sink.
//! Every stage runs its tasks through one [`Controller`]; any task can stop the whole run and
//! the first cause wins.

pub mod channel;
pub mod controller;
pub mod error;
pub mod fan_out;
pub mod scope;
pub mod sink;
pub mod source;
pub mod tracker;

pub use channel::{Recv, recv_or_cancel, send_or_cancel, stage_channel};
pub use controller::{Controller, DIAGNOSTIC_TARGET, DiagnosticSink, PipelineOpts};
pub use error::{Cause, Interrupted, PipelineError};
pub use fan_out::fan_out;
pub use scope::Scope;
pub use sink::sink;
pub use source::{Emitter, source};
pub use tracker::{TaskGuard, TaskTracker};

//! pipehash: cancellable Source → FanOut → Sink pipeline core on OS threads, plus a parallel
//! directory hasher built on it.
//!
//! The core lives in [`pipeline`]; [`hash_dir`] and [`engine`] are one driver of it.
//!
//! ```ignore
//! use pipehash::pipeline::{Controller, PipelineOpts, Scope, fan_out, sink, source};
//!
//! let (ctl, scope) = Controller::new(&Scope::new(), PipelineOpts::default());
//! let nums = source(&scope, &ctl, |out| {
//!     for n in 1..=5 {
//!         if out.emit(n).is_err() {
//!             break;
//!         }
//!     }
//!     Ok(())
//! });
//! let squares = fan_out(&scope, &ctl, nums, 1, |n: u64| Ok(n * n));
//! sink(&scope, &ctl, squares, |sq| println!("{sq}"));
//! ctl.wait_all();
//! assert!(ctl.cause().is_none());
//! ```

pub mod engine;
pub mod hash_dir;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use hash_dir::hash_dir;

/// Result alias used by public pipehash API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

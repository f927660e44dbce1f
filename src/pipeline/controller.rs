//! Pipeline controller: owns the derived scope and the in-flight task counter.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use super::error::{Cause, PipelineError};
use super::scope::Scope;
use super::tracker::{TaskGuard, TaskTracker};

/// Log target used by [`PipelineOpts::with_log_diagnostics`].
pub const DIAGNOSTIC_TARGET: &str = "pipehash::pipeline";

/// Receives the controller's internal trace lines.
pub type DiagnosticSink = Arc<dyn Fn(fmt::Arguments<'_>) + Send + Sync>;

/// Options for [`Controller::new`]. Without a diagnostic sink, trace output is discarded.
#[derive(Clone, Default)]
pub struct PipelineOpts {
    pub diagnostics: Option<DiagnosticSink>,
}

impl PipelineOpts {
    pub fn with_diagnostics<F>(mut self, sink: F) -> Self
    where
        F: Fn(fmt::Arguments<'_>) + Send + Sync + 'static,
    {
        self.diagnostics = Some(Arc::new(sink));
        self
    }

    /// Route diagnostics to the `log` facade at debug level.
    pub fn with_log_diagnostics(self) -> Self {
        self.with_diagnostics(|args| log::debug!(target: DIAGNOSTIC_TARGET, "{}", args))
    }
}

impl fmt::Debug for PipelineOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOpts")
            .field("diagnostics", &self.diagnostics.is_some())
            .finish()
    }
}

/// Coordinates one pipeline run. Cheap to clone; every clone drives the same run.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Shared>,
}

struct Shared {
    scope: Scope,
    tasks: TaskTracker,
    diagnostics: Option<DiagnosticSink>,
    spawned: AtomicUsize,
}

impl Controller {
    /// Derive a cancellable scope from `parent` and a controller that stops it.
    /// Pass the returned scope to every stage of this run.
    pub fn new(parent: &Scope, opts: PipelineOpts) -> (Controller, Scope) {
        let scope = parent.child();
        let controller = Controller {
            inner: Arc::new(Shared {
                scope: scope.clone(),
                tasks: TaskTracker::new(),
                diagnostics: opts.diagnostics,
                spawned: AtomicUsize::new(0),
            }),
        };
        controller.trace(format_args!("pipeline created"));
        (controller, scope)
    }

    /// Run `task` on its own thread and keep it counted until it returns or panics.
    /// A panic stops the pipeline with [`PipelineError::TaskPanicked`].
    pub fn register<F>(&self, name: impl Into<String>, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.register_guarded(name.into(), None, task);
    }

    /// Same as [`register`](Self::register), also holding `extra` (e.g. a worker-barrier guard)
    /// for the lifetime of the task.
    pub(crate) fn register_guarded<F>(&self, name: String, extra: Option<TaskGuard>, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.inner.tasks.enter();
        let id = self.inner.spawned.fetch_add(1, Ordering::Relaxed);
        let this = self.clone();
        let task_name = name.clone();
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", env!("CARGO_PKG_NAME"), name))
            .spawn(move || {
                let _guard = guard;
                let _extra = extra;
                this.trace(format_args!("task #{id} '{task_name}' started"));
                match panic::catch_unwind(AssertUnwindSafe(task)) {
                    Ok(()) => this.trace(format_args!("task #{id} '{task_name}' finished")),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        this.trace(format_args!("task #{id} '{task_name}' panicked: {message}"));
                        this.stop(Some(
                            PipelineError::TaskPanicked {
                                task: task_name,
                                message,
                            }
                            .into(),
                        ));
                    }
                }
            });
        // On failure the closure (and both guards in it) has already been dropped.
        if let Err(source) = spawned {
            self.stop(Some(PipelineError::Spawn { task: name, source }.into()));
        }
    }

    /// Cancel the pipeline's scope. Only the first call has an effect; its cause is kept.
    /// `None` means a graceful stop.
    pub fn stop(&self, cause: Option<anyhow::Error>) {
        let reason = match (&self.inner.diagnostics, &cause) {
            (None, _) => String::new(),
            (Some(_), Some(e)) => format!("{:#}", e),
            (Some(_), None) => "graceful".to_string(),
        };
        if self.inner.scope.cancel(cause) {
            self.trace(format_args!("stop requested ({reason})"));
        } else {
            self.trace(format_args!("stop ignored, already stopped ({reason})"));
        }
    }

    /// Block until every registered task, including ones registered while waiting, has finished.
    /// Call it from the driver, never from a registered task (the task would wait on itself).
    pub fn wait_all(&self) {
        self.inner.tasks.wait();
        self.trace(format_args!("all tasks finished"));
    }

    /// Bounded [`wait_all`](Self::wait_all). Returns true when all tasks finished in time.
    pub fn wait_all_timeout(&self, timeout: Duration) -> bool {
        let finished = self.inner.tasks.wait_timeout(timeout);
        if !finished {
            self.trace(format_args!(
                "wait timed out with {} tasks in flight",
                self.in_flight()
            ));
        }
        finished
    }

    pub fn in_flight(&self) -> usize {
        self.inner.tasks.in_flight()
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.scope.is_cancelled()
    }

    pub fn cause(&self) -> Option<Cause> {
        self.inner.scope.cause()
    }

    pub(crate) fn trace(&self, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.inner.diagnostics {
            sink(args);
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("scope", &self.inner.scope)
            .field("in_flight", &self.in_flight())
            .field("spawned", &self.inner.spawned.load(Ordering::Relaxed))
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

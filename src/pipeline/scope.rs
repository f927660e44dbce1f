//! Cancellable execution scope: a parent → child tree of cancellation signals carrying an optional cause.
//!
//! A scope is "done" once its internal sender is dropped; [`Scope::done`] then becomes ready in
//! every `select!` that watches it. Cancellation flows from parent to child only.

use crossbeam_channel::{Receiver, Sender, bounded, select};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::thread;
use std::time::{Duration, Instant};

use super::error::{Cause, PipelineError};

/// Cloneable handle to a cancellable context. Clones share the same state.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    /// Never receives a value; disconnects when the scope is cancelled.
    done_rx: Receiver<()>,
    deadline: Option<Instant>,
    /// Keeps ancestors (and their deadline timers) alive for as long as this scope is.
    _parent: Option<Arc<Inner>>,
}

struct State {
    /// `Some` while the scope is live. Taking it out is the cancellation.
    done_tx: Option<Sender<()>>,
    cause: Option<Cause>,
    children: Vec<Weak<Inner>>,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Scope {
    /// Root scope. Ends only when [`Scope::cancel`] is called on it.
    pub fn new() -> Self {
        Self::with_parts(None, None)
    }

    fn with_parts(deadline: Option<Instant>, parent: Option<Arc<Inner>>) -> Self {
        let (done_tx, done_rx) = bounded::<()>(0);
        Scope {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    done_tx: Some(done_tx),
                    cause: None,
                    children: Vec::new(),
                }),
                done_rx,
                deadline,
                _parent: parent,
            }),
        }
    }

    /// Derive a child that ends when `self` ends (with the same cause) or when cancelled directly.
    pub fn child(&self) -> Scope {
        self.derive(self.inner.deadline)
    }

    /// Derive a child that also ends at `deadline` with [`PipelineError::DeadlineExceeded`].
    /// An earlier parent deadline still applies.
    pub fn with_deadline(&self, deadline: Instant) -> Scope {
        let effective = match self.inner.deadline {
            Some(parent) if parent <= deadline => parent,
            _ => deadline,
        };
        let child = self.derive(Some(effective));
        if Some(effective) != self.inner.deadline {
            child.spawn_timer(effective);
        }
        child
    }

    /// [`Scope::with_deadline`] relative to now.
    pub fn with_timeout(&self, timeout: Duration) -> Scope {
        self.with_deadline(Instant::now() + timeout)
    }

    fn derive(&self, deadline: Option<Instant>) -> Scope {
        let child = Scope::with_parts(deadline, Some(Arc::clone(&self.inner)));
        let inherited = {
            let mut state = lock(&self.inner.state);
            if state.done_tx.is_some() {
                state.children.retain(|c| c.strong_count() > 0);
                state.children.push(Arc::downgrade(&child.inner));
                None
            } else {
                Some(state.cause.clone())
            }
        };
        // Parent already ended: the child is born ended.
        if let Some(cause) = inherited {
            child.cancel_with(cause);
        }
        child
    }

    fn spawn_timer(&self, deadline: Instant) {
        let scope = Arc::downgrade(&self.inner);
        let done = self.inner.done_rx.clone();
        let spawned = thread::Builder::new()
            .name(format!("{}-deadline", env!("CARGO_PKG_NAME")))
            .spawn(move || {
                select! {
                    recv(done) -> _ => {}
                    recv(crossbeam_channel::at(deadline)) -> _ => {
                        if let Some(inner) = scope.upgrade() {
                            Scope { inner }.cancel(Some(PipelineError::DeadlineExceeded.into()));
                        }
                    }
                }
            });
        if let Err(source) = spawned {
            self.cancel(Some(
                PipelineError::Spawn {
                    task: "deadline".to_string(),
                    source,
                }
                .into(),
            ));
        }
    }

    /// End this scope and all its descendants. The first call wins: its cause is kept and later
    /// calls are no-ops. Returns whether this call did the cancelling.
    pub fn cancel(&self, cause: Option<anyhow::Error>) -> bool {
        self.cancel_with(cause.map(Arc::new))
    }

    fn cancel_with(&self, cause: Option<Cause>) -> bool {
        let (done_tx, children) = {
            let mut state = lock(&self.inner.state);
            let Some(done_tx) = state.done_tx.take() else {
                return false;
            };
            state.cause = cause.clone();
            (done_tx, std::mem::take(&mut state.children))
        };
        drop(done_tx);
        for inner in children.iter().filter_map(Weak::upgrade) {
            Scope { inner }.cancel_with(cause.clone());
        }
        true
    }

    pub fn is_cancelled(&self) -> bool {
        lock(&self.inner.state).done_tx.is_none()
    }

    /// Cause recorded by the cancelling call. `None` while live, and after a graceful stop.
    pub fn cause(&self) -> Option<Cause> {
        lock(&self.inner.state).cause.clone()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Receiver that becomes ready (disconnected) once the scope ends. Use it as one arm of a
    /// `select!`; it never yields a value.
    pub fn done(&self) -> &Receiver<()> {
        &self.inner.done_rx
    }

    /// Block until the scope ends.
    pub fn wait(&self) {
        let _ = self.inner.done_rx.recv();
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Scope")
            .field("cancelled", &state.done_tx.is_none())
            .field("cause", &state.cause.as_ref().map(|c| c.to_string()))
            .field("deadline", &self.inner.deadline)
            .field("children", &state.children.len())
            .finish()
    }
}

//! Source stage: one producer task feeding an unbuffered channel.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};

use super::channel::{send_or_cancel, stage_channel};
use super::controller::Controller;
use super::error::Interrupted;
use super::scope::Scope;

/// Producer-side handle passed to a source generator. Owns the only sender of the stage's
/// output, so the channel closes when the emitter is dropped.
pub struct Emitter<T> {
    tx: Sender<T>,
    scope: Scope,
}

impl<T> Emitter<T> {
    /// Hand one item downstream, blocking until a reader takes it. Fails when the scope ends
    /// first or every reader is gone; the producer should return then.
    pub fn emit(&self, item: T) -> Result<(), Interrupted> {
        send_or_cancel(&self.scope, &self.tx, item)
    }

    /// For long traversals: poll between items and return early once true.
    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

/// Start a producer. `generate` pushes items through the [`Emitter`] at its own pace; when it
/// returns (or panics) the output channel is closed. An `Err` from `generate` stops the
/// whole pipeline with that error as cause.
pub fn source<T, G>(scope: &Scope, controller: &Controller, generate: G) -> Receiver<T>
where
    T: Send + 'static,
    G: FnOnce(&Emitter<T>) -> Result<()> + Send + 'static,
{
    let (tx, rx) = stage_channel::<T>();
    let emitter = Emitter {
        tx,
        scope: scope.clone(),
    };
    let ctl = controller.clone();
    controller.register("source", move || {
        let result = generate(&emitter);
        drop(emitter);
        match result {
            Ok(()) => ctl.trace(format_args!("source: generator returned, output closed")),
            Err(err) => {
                ctl.trace(format_args!("source: generator failed, output closed"));
                ctl.stop(Some(err));
            }
        }
    });
    rx
}

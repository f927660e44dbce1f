//! FanOut stage: N workers share one input and one output channel.
//!
//! A supervising task registers the workers, waits on a barrier scoped to exactly those
//! workers, then drops the last output sender. The output can therefore never close while a
//! worker might still write to it. Output order across workers is unspecified.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

use super::channel::{Recv, recv_or_cancel, send_or_cancel, stage_channel};
use super::controller::Controller;
use super::scope::Scope;
use super::tracker::TaskTracker;

struct Worker<In, Out, F> {
    id: usize,
    scope: Scope,
    controller: Controller,
    input: Receiver<In>,
    output: Sender<Out>,
    transform: Arc<F>,
}

impl<In, Out, F> Worker<In, Out, F>
where
    F: Fn(In) -> Result<Out>,
{
    fn run(self) {
        let id = self.id;
        let mut handled = 0_usize;
        loop {
            let item = match recv_or_cancel(&self.scope, &self.input) {
                Recv::Item(item) => item,
                Recv::Closed => break,
                Recv::Cancelled => {
                    self.controller
                        .trace(format_args!("fan-out worker {id}: cancelled while waiting"));
                    break;
                }
            };
            let out = match (self.transform)(item) {
                Ok(out) => out,
                Err(err) => {
                    self.controller
                        .trace(format_args!("fan-out worker {id}: transform failed"));
                    self.controller.stop(Some(err));
                    break;
                }
            };
            if let Err(reason) = send_or_cancel(&self.scope, &self.output, out) {
                self.controller
                    .trace(format_args!("fan-out worker {id}: result dropped ({reason})"));
                break;
            }
            handled += 1;
        }
        self.controller
            .trace(format_args!("fan-out worker {id}: exiting after {handled} items"));
    }
}

/// Start `worker_count` workers applying `transform` to items from `input`. A transform error
/// stops the whole pipeline. A count of 0 is treated as 1.
pub fn fan_out<In, Out, F>(
    scope: &Scope,
    controller: &Controller,
    input: Receiver<In>,
    worker_count: usize,
    transform: F,
) -> Receiver<Out>
where
    In: Send + 'static,
    Out: Send + 'static,
    F: Fn(In) -> Result<Out> + Send + Sync + 'static,
{
    let (tx, rx) = stage_channel::<Out>();
    let worker_count = if worker_count == 0 {
        controller.trace(format_args!("fan-out: worker count 0 raised to 1"));
        1
    } else {
        worker_count
    };
    let transform = Arc::new(transform);
    let scope = scope.clone();
    let ctl = controller.clone();
    controller.register("fan-out", move || {
        let workers = TaskTracker::new();
        for id in 0..worker_count {
            let worker = Worker {
                id,
                scope: scope.clone(),
                controller: ctl.clone(),
                input: input.clone(),
                output: tx.clone(),
                transform: Arc::clone(&transform),
            };
            ctl.register_guarded(
                format!("fan-out-{id}"),
                Some(workers.enter()),
                move || worker.run(),
            );
        }
        // Workers hold the only readers now, so a producer sees disconnect once they all exit.
        drop(input);
        workers.wait();
        drop(tx);
        ctl.trace(format_args!(
            "fan-out: {worker_count} workers finished, output closed"
        ));
    });
    rx
}

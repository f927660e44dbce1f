//! Sink stage: one consumer task at the end of the pipeline.

use crossbeam_channel::Receiver;

use super::channel::{Recv, recv_or_cancel};
use super::controller::Controller;
use super::scope::Scope;

/// Start a consumer that calls `consume` for every item until `input` closes or the scope
/// ends. Failures inside `consume` are its own business; nothing is reported to the controller.
pub fn sink<T, C>(scope: &Scope, controller: &Controller, input: Receiver<T>, mut consume: C)
where
    T: Send + 'static,
    C: FnMut(T) + Send + 'static,
{
    let scope = scope.clone();
    let ctl = controller.clone();
    controller.register("sink", move || {
        let mut consumed = 0_usize;
        loop {
            match recv_or_cancel(&scope, &input) {
                Recv::Item(item) => {
                    consume(item);
                    consumed += 1;
                }
                Recv::Closed => {
                    ctl.trace(format_args!("sink: end of stream after {consumed} items"));
                    break;
                }
                Recv::Cancelled => {
                    ctl.trace(format_args!("sink: cancelled after {consumed} items"));
                    break;
                }
            }
        }
    });
}

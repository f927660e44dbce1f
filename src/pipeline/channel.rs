//! Cancellation-aware channel operations shared by the stage constructors.
//!
//! Every blocking send or receive in a stage is a two-way `select!` against [`Scope::done`].
//! When both arms are ready at once the scope wins: a value received after cancellation is
//! dropped and a send is not attempted once the scope has ended.

use crossbeam_channel::{Receiver, Sender, bounded, select};

use super::error::Interrupted;
use super::scope::Scope;

/// Outcome of [`recv_or_cancel`].
pub enum Recv<T> {
    Item(T),
    /// All senders are gone: end of stream.
    Closed,
    Cancelled,
}

/// Unbuffered (rendezvous) channel used between stages.
pub fn stage_channel<T>() -> (Sender<T>, Receiver<T>) {
    bounded(0)
}

pub fn recv_or_cancel<T>(scope: &Scope, rx: &Receiver<T>) -> Recv<T> {
    select! {
        recv(scope.done()) -> _ => Recv::Cancelled,
        recv(rx) -> msg => match msg {
            Ok(_) if scope.is_cancelled() => Recv::Cancelled,
            Ok(item) => Recv::Item(item),
            Err(_) => Recv::Closed,
        },
    }
}

pub fn send_or_cancel<T>(scope: &Scope, tx: &Sender<T>, item: T) -> Result<(), Interrupted> {
    if scope.is_cancelled() {
        return Err(Interrupted::Cancelled);
    }
    select! {
        recv(scope.done()) -> _ => Err(Interrupted::Cancelled),
        send(tx, item) -> res => res.map_err(|_| Interrupted::Disconnected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn recv_sees_closed_stream() {
        let scope = Scope::new();
        let (tx, rx) = stage_channel::<u32>();
        drop(tx);
        assert!(matches!(recv_or_cancel(&scope, &rx), Recv::Closed));
    }

    #[test]
    fn recv_gives_up_on_cancel() {
        let scope = Scope::new();
        let (_tx, rx) = stage_channel::<u32>();
        scope.cancel(None);
        assert!(matches!(recv_or_cancel(&scope, &rx), Recv::Cancelled));
    }

    #[test]
    fn send_is_refused_after_cancel() {
        let scope = Scope::new();
        let (tx, _rx) = stage_channel::<u32>();
        scope.cancel(None);
        assert_eq!(send_or_cancel(&scope, &tx, 1), Err(Interrupted::Cancelled));
    }

    #[test]
    fn send_reports_missing_reader() {
        let scope = Scope::new();
        let (tx, rx) = stage_channel::<u32>();
        drop(rx);
        assert_eq!(send_or_cancel(&scope, &tx, 1), Err(Interrupted::Disconnected));
    }

    #[test]
    fn rendezvous_hands_item_over() {
        let scope = Scope::new();
        let (tx, rx) = stage_channel::<u32>();
        let s = scope.clone();
        let handle = thread::spawn(move || send_or_cancel(&s, &tx, 7));
        assert!(matches!(recv_or_cancel(&scope, &rx), Recv::Item(7)));
        assert_eq!(handle.join().unwrap(), Ok(()));
    }
}

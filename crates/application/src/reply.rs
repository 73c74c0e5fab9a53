//! One-shot bridge from a collaborator callback to a single awaited value.
//!
//! Each prompt or picker invocation gets its own channel. The [`Reply`] half
//! is consumed when answered, so a second answer cannot be delivered, and a
//! reply dropped without an answer wakes the waiting side with `None`.

use tokio::sync::oneshot;

pub fn channel<T>() -> (Reply<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Reply { tx }, Pending { rx })
}

#[derive(Debug)]
pub struct Reply<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Reply<T> {
    pub fn send(self, value: T) {
        // The waiting side may already be gone; nothing is left to deliver to.
        let _ = self.tx.send(value);
    }

    /// Ends the invocation without a value.
    pub fn cancel(self) {}
}

#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    pub async fn wait(self) -> Option<T> {
        self.rx.await.ok()
    }
}

/// Message channel -- the text queue between task threads and the UI.
///
/// Workers push lines through a cloned [`MessageSender`]; the UI drains
/// everything that is pending once per poll. The channel is unbounded so a
/// worker never waits on the UI, and the channel keeps its own receiver so a
/// send can never observe a disconnected queue.
use crossbeam_channel::{unbounded, Receiver, Sender};

/// A single line (or block of lines) of output text.
pub type Message = String;

/// Owning end of the channel. Lives with the UI.
pub struct MessageChannel {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl Default for MessageChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageChannel {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A producer handle for a worker thread.
    pub fn sender(&self) -> MessageSender {
        MessageSender {
            tx: self.tx.clone(),
        }
    }

    /// Enqueue from the owning side (used for UI-originated notices).
    pub fn send(&self, text: impl Into<Message>) {
        // The receiver is owned by `self`, so this cannot fail.
        let _ = self.tx.send(text.into());
    }

    /// Return every message enqueued since the previous drain, oldest first.
    ///
    /// Never blocks; returns an empty vec when nothing is pending.
    pub fn drain_all(&self) -> Vec<Message> {
        self.rx.try_iter().collect()
    }

    /// Number of messages waiting to be drained.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Cloneable producer handle.
#[derive(Clone)]
pub struct MessageSender {
    tx: Sender<Message>,
}

impl MessageSender {
    /// Enqueue a message. Never blocks.
    ///
    /// If the owning [`MessageChannel`] has already been dropped (the window
    /// closed while a task was still running) the message is discarded.
    pub fn send(&self, text: impl Into<Message>) {
        let _ = self.tx.send(text.into());
    }
}

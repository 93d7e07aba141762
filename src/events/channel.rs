//! Event channel built on crossbeam-channel.
//!
//! Workers in the batch scheduler share one sender; the CLI (or any other
//! front end) drains the receiver on its own thread.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{BatchEvent, BatchProgress, Event, Stage};

/// Sending half of the event channel. Cheap to clone, safe to share
/// between worker threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver is not an error: progress reporting is optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    /// Report batch progress for `stage`.
    pub fn progress(&self, stage: Stage, completed: usize, total: usize, current: Option<String>) {
        self.send(Event::Batch(BatchEvent::Progress(BatchProgress {
            stage,
            completed,
            total,
            current,
        })));
    }
}

/// Receiving half of the event channel.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel. Events are small, so this is the usual choice.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose receiver is already gone. Used by `run()` variants that
/// report nothing, and by tests.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

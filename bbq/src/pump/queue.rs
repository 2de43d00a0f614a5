//! Receive-only event queue
//!
//! Bounded tokio mpsc channel underneath. A capacity of 0 cannot be expressed
//! by tokio directly, so it becomes a one-slot channel where every event
//! carries an acknowledgement the receiving side fires on pickup; the pump
//! treats the event as delivered only once acknowledged. An event whose
//! acknowledgement can no longer be delivered was abandoned by the pump and
//! is skipped by the receiving side.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures::Stream;
use tokio::sync::{mpsc, oneshot};

pub use tokio::sync::mpsc::error::TryRecvError;

struct Delivery<T> {
    event: T,
    ack: Option<oneshot::Sender<()>>,
}

impl<T> Delivery<T> {
    /// The event, unless the pump gave up on handing it over
    fn accept(self) -> Option<T> {
        match self.ack {
            Some(ack) => ack.send(()).ok().map(|()| self.event),
            None => Some(self.event),
        }
    }
}

/// The receiving side dropped the queue
#[derive(Debug)]
pub(crate) struct QueueGone;

pub(crate) struct EventSender<T> {
    tx: mpsc::Sender<Delivery<T>>,
    handoff: bool,
}

impl<T> EventSender<T> {
    /// Deliver one event, waiting for buffer space (or pickup when unbuffered)
    pub(crate) async fn send(&self, event: T) -> Result<(), QueueGone> {
        if !self.handoff {
            return self.tx.send(Delivery { event, ack: None }).await.map_err(|_| QueueGone);
        }

        let (ack, picked_up) = oneshot::channel();
        self.tx.send(Delivery { event, ack: Some(ack) }).await.map_err(|_| QueueGone)?;
        picked_up.await.map_err(|_| QueueGone)
    }
}

/// Typed events decoded from a ring buffer, in the order they were read
///
/// Closed by the pump when it terminates: [`recv`](Self::recv) then returns
/// the events still buffered followed by `None`. Also usable as a
/// [`Stream`].
pub struct EventQueue<T> {
    rx: mpsc::Receiver<Delivery<T>>,
    capacity: usize,
}

impl<T> EventQueue<T> {
    /// Receive the next event, or `None` once the pump terminated
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            if let Some(event) = self.rx.recv().await?.accept() {
                return Some(event);
            }
        }
    }

    /// Receive an event if one is ready right now
    ///
    /// # Errors
    /// [`TryRecvError::Empty`] if nothing is buffered, [`TryRecvError::Disconnected`]
    /// if the pump terminated and the queue is drained
    pub fn try_recv(&mut self) -> Result<T, TryRecvError> {
        loop {
            if let Some(event) = self.rx.try_recv()?.accept() {
                return Ok(event);
            }
        }
    }

    /// Configured capacity (0 for synchronous hand-off)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Stream for EventQueue<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let rx = &mut self.get_mut().rx;
        loop {
            match ready!(rx.poll_recv(cx)) {
                Some(delivery) => {
                    if let Some(event) = delivery.accept() {
                        return Poll::Ready(Some(event));
                    }
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

impl<T> std::fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").field("capacity", &self.capacity).finish_non_exhaustive()
    }
}

pub(crate) fn channel<T>(capacity: usize) -> (EventSender<T>, EventQueue<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx, handoff: capacity == 0 }, EventQueue { rx, capacity })
}

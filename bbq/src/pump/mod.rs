//! # Event Pump
//!
//! Turns a [`RecordSource`] into an [`EventQueue`] of typed events.
//!
//! Every pump runs two tasks:
//!
//! - **Cancellation watcher**: waits for the token, then closes the reader.
//!   Closing the reader is the only way a read stuck waiting for data gets
//!   unblocked.
//! - **Decode-and-forward loop**: reads a record, decodes it, and delivers it
//!   into the queue. Read and decode faults go to the optional error sink and
//!   the loop carries on. Delivery races the token, so a full queue nobody
//!   drains cannot keep the loop alive past cancellation.
//!
//! The loop owns the queue's sending side: the queue closes when, and only
//! when, the loop returns. It returns when the reader reports closed, or when
//! the token fires while an event is waiting for delivery.

mod decode;
mod options;
mod queue;

use aya::Pod;
use log::{debug, trace, warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use crate::domain::{Error, PumpError, ReadError};
use crate::reader::{ReaderCloser, RecordReader, RecordSource};

pub use decode::decode;
pub use options::Options;
pub use queue::{EventQueue, TryRecvError};

use queue::EventSender;

/// Start pumping `T` events out of `source` until `token` is cancelled
///
/// Returns immediately; reading happens on the current tokio runtime. The
/// queue closes after the token is cancelled or after the reader was closed
/// by someone else.
///
/// ```no_run
/// # async fn demo(map: aya::maps::Map) -> Result<(), bbq::Error> {
/// use bbq::Options;
/// use bbq_common::Event;
/// use tokio_util::sync::CancellationToken;
///
/// let token = CancellationToken::new();
/// let mut events = bbq::new::<Event, _>(token.clone(), map, Options::default().capacity(16))?;
/// while let Some(event) = events.recv().await {
///     println!("magic {}", event.magic);
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Errors
/// - [`Error::NegativeCapacity`] for a negative [`Options::capacity`]
/// - [`Error::NoRuntime`] when called outside a tokio runtime
/// - [`Error::Open`] when `source` cannot be opened (e.g. not a ring buffer)
///
/// Nothing is spawned when an error is returned.
pub fn new<T, S>(token: CancellationToken, source: S, options: Options) -> Result<EventQueue<T>, Error>
where
    T: Pod + Send + 'static,
    S: RecordSource,
{
    let capacity = options.validated_capacity()?;
    let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
    let reader = source.open()?;

    let (events, queue) = queue::channel(capacity);
    let (errors, tracker) = options.into_parts();

    let watcher = watch_cancellation(token.clone(), reader.closer());
    let forwarder = forward_records(token, reader, events, errors);
    match tracker {
        Some(tracker) => {
            tracker.spawn_on(watcher, &runtime);
            tracker.spawn_on(forwarder, &runtime);
        }
        None => {
            runtime.spawn(watcher);
            runtime.spawn(forwarder);
        }
    }

    debug!("Event pump running (capacity {capacity})");
    Ok(queue)
}

async fn watch_cancellation(token: CancellationToken, closer: ReaderCloser) {
    token.cancelled().await;
    // An external close may have beaten us to it
    let _ = closer.close();
}

async fn forward_records<T, R>(
    token: CancellationToken,
    mut reader: R,
    events: EventSender<T>,
    errors: Option<mpsc::Sender<PumpError>>,
) where
    T: Pod + Send + 'static,
    R: RecordReader,
{
    loop {
        let record = match reader.read().await {
            Ok(record) => record,
            Err(ReadError::Closed) => {
                debug!("Ring buffer reader closed, closing event queue");
                return;
            }
            Err(e) => {
                report(errors.as_ref(), e.into());
                continue;
            }
        };

        let event = match decode::<T>(&record) {
            Ok(event) => event,
            Err(e) => {
                report(errors.as_ref(), e.into());
                continue;
            }
        };
        trace!("Forwarding {}-byte record", record.len());

        tokio::select! {
            delivered = events.send(event) => {
                if delivered.is_err() {
                    // Nobody will ever receive again; hold on until the
                    // watcher releases the reader.
                    debug!("Event queue dropped by receiver, waiting for cancellation");
                    token.cancelled().await;
                    return;
                }
            }
            () = token.cancelled() => {
                debug!("Cancelled while delivering an event, closing event queue");
                return;
            }
        }
    }
}

/// Best-effort error reporting; never waits for the sink
fn report(sink: Option<&mpsc::Sender<PumpError>>, err: PumpError) {
    let Some(sink) = sink else {
        trace!("Dropping unreported pump error: {err}");
        return;
    };

    match sink.try_send(err) {
        Ok(()) => {}
        Err(TrySendError::Full(err)) => warn!("Error sink full, dropping: {err}"),
        Err(TrySendError::Closed(err)) => debug!("Error sink closed, dropping: {err}"),
    }
}

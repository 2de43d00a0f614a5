//! Event pump configuration

use tokio::sync::mpsc::Sender;
use tokio_util::task::TaskTracker;

use crate::domain::{Error, PumpError};

/// Optional settings for [`crate::new`]
///
/// ```no_run
/// # use bbq::Options;
/// let (errors, _error_rx) = tokio::sync::mpsc::channel(16);
/// let options = Options::default().capacity(64).error_sink(errors);
/// ```
#[derive(Debug, Default)]
pub struct Options {
    capacity: isize,
    error_sink: Option<Sender<PumpError>>,
    tracker: Option<TaskTracker>,
}

impl Options {
    /// Number of events the queue buffers
    ///
    /// 0 (the default) hands each event over synchronously: the pump waits
    /// until the receiver took it before reading the next record. Negative
    /// values make [`crate::new`] fail.
    #[must_use]
    pub fn capacity(mut self, capacity: isize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Caller-owned channel receiving read and decode errors
    ///
    /// Errors are offered with `try_send` and dropped when the channel is full.
    /// The pump never closes the channel; it only drops `sink` when it
    /// terminates. Keep a clone of the sender if the receiver must not see the
    /// channel close once the pump is gone:
    ///
    /// ```no_run
    /// # use bbq::Options;
    /// let (errors, _error_rx) = tokio::sync::mpsc::channel(16);
    /// let options = Options::default().error_sink(errors.clone());
    /// // `errors` keeps the sink open after the pump terminated
    /// ```
    #[must_use]
    pub fn error_sink(mut self, sink: Sender<PumpError>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Spawn the pump's tasks on `tracker` instead of plain `tokio::spawn`
    #[must_use]
    pub fn task_tracker(mut self, tracker: TaskTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub(crate) fn validated_capacity(&self) -> Result<usize, Error> {
        usize::try_from(self.capacity).map_err(|_| Error::NegativeCapacity(self.capacity))
    }

    pub(crate) fn into_parts(self) -> (Option<Sender<PumpError>>, Option<TaskTracker>) {
        (self.error_sink, self.tracker)
    }
}

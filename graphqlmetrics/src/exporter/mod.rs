//! Batches items in the background and hands the batches to a [`Sink`].
//!
//! Producers never wait on delivery. [`Exporter::try_record`] drops the item when the
//! queue is full, and delivery failures only show up in logs. A batch is sent when it
//! reaches `batch_size` or when `interval` passes, whichever comes first. Each batch is
//! exported on its own task with retries, so a slow collector does not hold up batching.
//!
//! [`Exporter::shutdown`] closes intake, drains the queue into final batches, waits for
//! the exports still running, and closes the sink.

use std::{
    mem,
    sync::{
        atomic::{AtomicU8, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{
    runtime::{Handle, TryCurrentError},
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::sink::{Sink, SinkError, SinkErrorHandler};

mod backoff;
mod buffer_pool;
mod settings;

pub(crate) use backoff::Backoff;
pub(crate) use buffer_pool::BufferPool;
pub use settings::{ExporterSettings, RetryOptions};

const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors from creating or stopping an [`Exporter`].
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    /// A setting that must be positive was zero. Names the field.
    #[error("invalid exporter settings: {0} must be greater than zero")]
    InvalidSettings(&'static str),
    /// The exporter spawns its batching task, so it needs a tokio runtime.
    #[error("an exporter must be created within a tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
    /// Exports were still running when the shutdown deadline passed. They were cancelled.
    #[error("exports were still in flight after {0:?}")]
    ShutdownTimeout(Duration),
    /// The sink failed to close.
    #[error("sink failed to close: {0}")]
    Sink(#[from] SinkError),
}

/// Where an exporter is in its life. Transitions only go forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExporterState {
    /// Taking new items
    Accepting = 0,
    /// Shutdown was requested; queued items are being exported
    Draining = 1,
    /// Done. The sink is closed.
    Stopped = 2,
}

impl From<u8> for ExporterState {
    fn from(value: u8) -> Self {
        match value {
            0 => ExporterState::Accepting,
            1 => ExporterState::Draining,
            _ => ExporterState::Stopped,
        }
    }
}

/// Batches items and exports them to a sink in the background.
///
/// Create one per destination with [`Exporter::new`], share it with the request path,
/// and call [`Exporter::shutdown`] once when the process stops. Do not use it after that.
pub struct Exporter<T, TSink> {
    dispatcher: Arc<Dispatcher<T, TSink>>,
    sender: mpsc::Sender<T>,
    state: AtomicU8,
    stop_batching: CancellationToken,
    batching_loop: Mutex<Option<JoinHandle<()>>>,
}

impl<T, TSink> std::fmt::Debug for Exporter<T, TSink> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("state", &self.state())
            .field("in_flight", &self.in_flight())
            .field("settings", &self.dispatcher.settings)
            .finish()
    }
}

impl<T, TSink> Exporter<T, TSink>
where
    T: Send + Sync + 'static,
    TSink: Sink<T>,
{
    /// Validate `settings` and start the batching task on the current tokio runtime.
    ///
    /// `is_retryable` is asked about every failed export while retry is enabled.
    pub fn new(
        sink: TSink,
        is_retryable: impl Fn(&SinkError) -> bool + Send + Sync + 'static,
        settings: ExporterSettings,
    ) -> Result<Self, ExporterError> {
        settings.validate()?;
        let runtime = Handle::try_current()?;

        let (sender, receiver) = mpsc::channel(settings.queue_size);
        let stop_batching = CancellationToken::new();
        let dispatcher = Arc::new(Dispatcher {
            buffers: BufferPool::new(settings.batch_size, settings.queue_size),
            sink,
            is_retryable: Arc::new(is_retryable),
            settings,
            in_flight: AtomicUsize::new(0),
            export_requests: CancellationToken::new(),
        });
        let batching_loop =
            runtime.spawn(dispatcher.clone().batch_forever(receiver, stop_batching.clone()));
        log::debug!("exporter started: {:?}", dispatcher.settings);

        Ok(Self {
            dispatcher,
            sender,
            state: AtomicU8::new(ExporterState::Accepting as u8),
            stop_batching,
            batching_loop: Mutex::new(Some(batching_loop)),
        })
    }

    /// Record one item.
    ///
    /// With `synchronous`, the item is exported right away as a batch of one, on this task
    /// and with the usual retries. Delivery problems are logged, so this always returns
    /// true. Otherwise this is [`Exporter::try_record`].
    pub async fn record(&self, item: T, synchronous: bool) -> bool {
        if !synchronous {
            return self.try_record(item);
        }
        if self.state() == ExporterState::Stopped {
            log::warn!("exporter is stopped, not exporting synchronous item");
            return true;
        }
        self.dispatcher
            .export_with_retry(std::slice::from_ref(&item))
            .await;
        true
    }

    /// Queue one item for the next batch without waiting.
    ///
    /// Returns false when the item was dropped: the queue was full or the exporter is
    /// shutting down.
    pub fn try_record(&self, item: T) -> bool {
        if self.state() != ExporterState::Accepting {
            return false;
        }
        match self.sender.try_send(item) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!(
                    "exporter queue is full ({} items), dropping item",
                    self.dispatcher.settings.queue_size
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Stop intake, export everything still queued, and close the sink.
    ///
    /// Waits up to `timeout` for running exports. Past that, they are cancelled and
    /// [`ExporterError::ShutdownTimeout`] is returned. The sink is closed either way.
    /// Only the first call does anything.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ExporterError> {
        if self
            .state
            .compare_exchange(
                ExporterState::Accepting as u8,
                ExporterState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            log::debug!("exporter shutdown was already requested");
            return Ok(());
        }

        self.stop_batching.cancel();
        let batching_loop = self
            .batching_loop
            .lock()
            .expect("local mutex should not be poisoned")
            .take();
        let drained = tokio::time::timeout(timeout, async {
            if let Some(batching_loop) = batching_loop {
                if let Err(e) = batching_loop.await {
                    log::error!("exporter batching task failed: {e}");
                }
            }
            while self.dispatcher.in_flight.load(Ordering::Acquire) != 0 {
                tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
            }
        })
        .await;

        self.dispatcher.export_requests.cancel();
        let closed = self.dispatcher.sink.close().await;
        self.state
            .store(ExporterState::Stopped as u8, Ordering::Release);

        match (drained, closed) {
            (Err(_), closed) => {
                if let Err(e) = closed {
                    log::error!("failed to close sink: {e}");
                }
                log::error!(
                    "exporter shutdown timed out after {timeout:?} with {} exports in flight",
                    self.in_flight()
                );
                Err(ExporterError::ShutdownTimeout(timeout))
            }
            (Ok(()), Err(e)) => Err(e.into()),
            (Ok(()), Ok(())) => {
                log::debug!("exporter stopped");
                Ok(())
            }
        }
    }
}

impl<T, TSink> Exporter<T, TSink> {
    pub fn state(&self) -> ExporterState {
        ExporterState::from(self.state.load(Ordering::Acquire))
    }

    /// Batches handed to the sink that have not finished yet, retries included.
    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &ExporterSettings {
        &self.dispatcher.settings
    }
}

/// The part of an exporter shared with its background tasks.
struct Dispatcher<T, TSink> {
    sink: TSink,
    is_retryable: SinkErrorHandler,
    settings: ExporterSettings,
    in_flight: AtomicUsize,
    buffers: BufferPool<T>,
    export_requests: CancellationToken,
}

impl<T, TSink> Dispatcher<T, TSink>
where
    T: Send + Sync + 'static,
    TSink: Sink<T>,
{
    async fn batch_forever(
        self: Arc<Self>,
        mut receiver: mpsc::Receiver<T>,
        stop: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick would complete immediately.
        interval.reset();

        let mut batch = self.buffers.get();
        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                _ = interval.tick() => {
                    if !batch.is_empty() {
                        self.dispatch(mem::replace(&mut batch, self.buffers.get()));
                    }
                }
                item = receiver.recv() => match item {
                    Some(item) => {
                        batch.push(item);
                        if self.settings.batch_size <= batch.len() {
                            self.dispatch(mem::replace(&mut batch, self.buffers.get()));
                        }
                    }
                    // every exporter handle is gone
                    None => break,
                },
            }
        }
        self.drain(receiver, batch);
    }

    fn drain(self: &Arc<Self>, mut receiver: mpsc::Receiver<T>, mut batch: Vec<T>) {
        receiver.close();
        let mut drained = 0;
        while let Ok(item) = receiver.try_recv() {
            drained += 1;
            batch.push(item);
            if self.settings.batch_size <= batch.len() {
                self.dispatch(mem::replace(&mut batch, self.buffers.get()));
            }
        }
        if batch.is_empty() {
            self.buffers.put(batch);
        } else {
            self.dispatch(batch);
        }
        log::debug!("exporter drained {drained} queued items");
    }

    fn dispatch(self: &Arc<Self>, batch: Vec<T>) {
        let in_flight = InFlight::new(self.clone(), batch);
        tokio::spawn(async move {
            in_flight
                .dispatcher
                .export_with_retry(&in_flight.batch)
                .await;
        });
    }

    async fn export_with_retry(&self, batch: &[T]) {
        let mut error = match self.export(batch).await {
            Ok(()) => return,
            Err(error) => error,
        };
        let retry = &self.settings.retry;
        if !retry.enabled || !(self.is_retryable)(&error) {
            log::error!(
                "failed to export batch of {} items, not retrying: {error}",
                batch.len()
            );
            return;
        }

        let mut backoff = Backoff::new(retry);
        for attempt in 1..=retry.max_retry {
            let delay = backoff.next_delay();
            log::debug!(
                "retry {attempt}/{} of a batch of {} items in {delay:?} after: {error}",
                retry.max_retry,
                batch.len()
            );
            tokio::select! {
                _ = self.export_requests.cancelled() => {
                    log::error!(
                        "abandoned batch of {} items after {attempt} attempts at shutdown: {error}",
                        batch.len()
                    );
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            error = match self.export(batch).await {
                Ok(()) => {
                    log::debug!(
                        "exported batch of {} items on attempt {}",
                        batch.len(),
                        attempt + 1
                    );
                    return;
                }
                Err(error) => error,
            };
            if !(self.is_retryable)(&error) {
                log::error!(
                    "failed to export batch of {} items after {} attempts, not retrying: {error}",
                    batch.len(),
                    attempt + 1
                );
                return;
            }
        }
        log::error!(
            "failed to export batch of {} items after {} attempts: {error}",
            batch.len(),
            retry.max_retry + 1
        );
    }

    /// One attempt, bounded by the export timeout and abandoned at shutdown.
    async fn export(&self, batch: &[T]) -> Result<(), SinkError> {
        let timeout = self.settings.export_timeout;
        tokio::select! {
            _ = self.export_requests.cancelled() => Err(SinkError::Cancelled),
            result = tokio::time::timeout(timeout, self.sink.export(batch)) => match result {
                Ok(result) => result,
                Err(_elapsed) => Err(SinkError::Timeout(timeout)),
            },
        }
    }
}

/// One dispatched batch. Counted in `in_flight` until dropped, even if the export panics.
struct InFlight<T, TSink> {
    dispatcher: Arc<Dispatcher<T, TSink>>,
    batch: Vec<T>,
}

impl<T, TSink> InFlight<T, TSink> {
    fn new(dispatcher: Arc<Dispatcher<T, TSink>>, batch: Vec<T>) -> Self {
        dispatcher.in_flight.fetch_add(1, Ordering::AcqRel);
        Self { dispatcher, batch }
    }
}

impl<T, TSink> Drop for InFlight<T, TSink> {
    fn drop(&mut self) {
        self.dispatcher.buffers.put(mem::take(&mut self.batch));
        self.dispatcher.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

//! Background click accounting.
//!
//! The redirect path hands a [`ClickEvent`] to a [`ClickRecorder`] and returns
//! immediately. [`run_click_worker`] drains the channel and applies each event
//! with the repository's atomic increment, retrying transient storage failures
//! with jittered exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ShortUrlRepository;
use crate::error::AppError;

/// Retries after the first failed increment.
const MAX_RETRIES: usize = 3;

/// Sending half of the click channel.
#[derive(Clone, Debug)]
pub struct ClickRecorder {
    sender: mpsc::Sender<ClickEvent>,
    deferred: Arc<Semaphore>,
    max_deferred: usize,
}

impl ClickRecorder {
    /// Creates a recorder and the receiver to hand to [`run_click_worker`].
    ///
    /// Up to `capacity` further events may wait for room once the queue is
    /// full; see [`ClickRecorder::with_overflow`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        Self::with_overflow(capacity, capacity)
    }

    /// Creates a recorder whose full queue defers at most `max_deferred`
    /// events. Clicks beyond that are dropped and counted.
    pub fn with_overflow(
        capacity: usize,
        max_deferred: usize,
    ) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let recorder = Self {
            sender,
            deferred: Arc::new(Semaphore::new(max_deferred)),
            max_deferred,
        };
        (recorder, receiver)
    }

    /// Queues a click without waiting.
    ///
    /// When the queue is full the event is moved to a spawned task that waits
    /// for capacity, so short bursts are delayed rather than lost. The number
    /// of waiting events is bounded; once that bound is reached, or after the
    /// worker has stopped, events are dropped.
    pub fn record(&self, code: &str) {
        match self.sender.try_send(ClickEvent::new(code)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                let Ok(permit) = self.deferred.clone().try_acquire_owned() else {
                    counter!("shortener_clicks_dropped_total").increment(1);
                    debug!(code = %event.code, "Click overflow full, click dropped");
                    return;
                };

                debug!(code = %event.code, "Click queue full, deferring event");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(e) = sender.send(event).await {
                        counter!("shortener_clicks_dropped_total").increment(1);
                        warn!(code = %e.0.code, "Click worker stopped, click dropped");
                    }
                });
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                counter!("shortener_clicks_dropped_total").increment(1);
                warn!(code = %event.code, "Click worker stopped, click dropped");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Remaining free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Events currently waiting for queue capacity.
    pub fn deferred(&self) -> usize {
        self.max_deferred - self.deferred.available_permits()
    }
}

/// Drains click events until every [`ClickRecorder`] is dropped.
///
/// At most `concurrency` increments are in flight at once. Events still in
/// flight when the channel closes are awaited before returning.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn ShortUrlRepository>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            record_click(repository.as_ref(), &event).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn record_click(repository: &dyn ShortUrlRepository, event: &ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_millis(500))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::spawn(
        strategy,
        || repository.increment_click_and_touch(&event.code, event.resolved_at),
        |e: &AppError| e.is_retryable(),
    )
    .await;

    match result {
        Ok(()) => {
            counter!("shortener_clicks_recorded_total").increment(1);
        }
        Err(AppError::NotFound { .. }) => {
            warn!(code = %event.code, "Click for unknown short code ignored");
        }
        Err(e) => {
            counter!("shortener_clicks_failed_total").increment(1);
            error!(code = %event.code, error = %e, "Failed to record click");
        }
    }
}

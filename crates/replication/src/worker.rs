// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The outbox push worker.
//!
//! The worker is the only writer of outbox status. It holds the persistence
//! lock to claim and settle events but never while talking to the mirror.

use crate::SharedPersistence;
use crate::backoff::retry_delay;
use crate::config::ReplicationConfig;
use crate::error::{MirrorError, ReplicationError};
use crate::mirror::{Mirror, MirrorRow};
use crate::transform::to_mirror_row;
use shiftbook_outbox::{OutboxEvent, OutboxOperation, now_millis};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Applies one event to the mirror.
///
/// Inserts and updates replace the row keyed by the entity ID, appending it
/// when absent. Deletes remove the row if present. Applying the same event
/// twice leaves the mirror as applying it once.
///
/// # Errors
///
/// Returns the first mirror failure.
pub async fn apply_event(mirror: &dyn Mirror, event: &OutboxEvent) -> Result<(), MirrorError> {
    let sheet: &str = event.entity_table.sheet_name();

    match event.operation {
        OutboxOperation::Insert | OutboxOperation::Update => {
            let row: MirrorRow = to_mirror_row(&event.payload);
            mirror.upsert(sheet, &event.entity_id, row).await
        }
        OutboxOperation::Delete => {
            if !mirror.delete(sheet, &event.entity_id).await? {
                debug!(sheet, entity_id = %event.entity_id, "Mirror row already absent");
            }
            Ok(())
        }
    }
}

/// What one push pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushSummary {
    /// Events claimed from the outbox.
    pub claimed: usize,
    /// Events applied and marked done.
    pub delivered: usize,
    /// Events rescheduled after a failure.
    pub retried: usize,
    /// Events that ran out of attempts.
    pub failed: usize,
    /// Claimed events returned untouched after the mirror throttled us.
    pub released: usize,
}

/// Drains the outbox into the mirror.
pub struct ReplicationWorker {
    persistence: SharedPersistence,
    mirror: Arc<dyn Mirror>,
    config: ReplicationConfig,
    shutdown: CancellationToken,
}

impl ReplicationWorker {
    /// Creates the worker. Nothing runs until [`ReplicationWorker::run`].
    #[must_use]
    pub fn new(
        persistence: SharedPersistence,
        mirror: Arc<dyn Mirror>,
        config: ReplicationConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            persistence,
            mirror,
            config,
            shutdown,
        }
    }

    /// Returns events abandoned in flight by a previous run to the queue.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub async fn reap(&self) -> Result<usize, ReplicationError> {
        Ok(self.persistence.lock().await.reap_in_flight_events()?)
    }

    /// Claims one batch and delivers it.
    ///
    /// If the store fails while settling an event, that event and the rest
    /// of the batch are returned to the queue before the error is reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails. Mirror failures are recorded on
    /// the events, not returned.
    pub async fn push_once(&self) -> Result<PushSummary, ReplicationError> {
        let claimed: Vec<OutboxEvent> = self
            .persistence
            .lock()
            .await
            .claim_outbox_batch(now_millis(), self.config.batch_size)?;

        let mut summary: PushSummary = PushSummary {
            claimed: claimed.len(),
            ..PushSummary::default()
        };
        if claimed.is_empty() {
            return Ok(summary);
        }
        debug!(count = claimed.len(), "Delivering outbox batch");

        for (position, event) in claimed.iter().enumerate() {
            let Some(event_id) = event.event_id else {
                continue;
            };

            let outcome: Result<(), MirrorError> = self.deliver(event).await;

            match self.settle(event, event_id, outcome, &mut summary).await {
                Ok(false) => {}
                Ok(true) => {
                    let rest: Vec<i64> = claimed[position + 1..]
                        .iter()
                        .filter_map(|e| e.event_id)
                        .collect();
                    summary.released = self.persistence.lock().await.release_events(&rest)?;
                    break;
                }
                Err(e) => {
                    self.release_unsettled(&claimed[position..]).await;
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    /// Records the outcome of one delivery. Returns whether the rest of the
    /// batch must wait.
    async fn settle(
        &self,
        event: &OutboxEvent,
        event_id: i64,
        outcome: Result<(), MirrorError>,
        summary: &mut PushSummary,
    ) -> Result<bool, ReplicationError> {
        match outcome {
            Ok(()) => {
                self.persistence
                    .lock()
                    .await
                    .mark_event_done(event_id, now_millis())?;
                summary.delivered += 1;
                Ok(false)
            }
            Err(MirrorError::RateLimited) => {
                if self.throttled(event, event_id).await? {
                    summary.failed += 1;
                } else {
                    summary.retried += 1;
                }
                Ok(true)
            }
            Err(e) => {
                if self.failed_attempt(event, event_id, &e).await? {
                    summary.failed += 1;
                } else {
                    summary.retried += 1;
                }
                Ok(false)
            }
        }
    }

    async fn release_unsettled(&self, events: &[OutboxEvent]) {
        let ids: Vec<i64> = events.iter().filter_map(|e| e.event_id).collect();
        match self.persistence.lock().await.release_events(&ids) {
            Ok(released) => warn!(released, "Returned unsettled outbox events to the queue"),
            Err(e) => error!(
                error = %e,
                count = ids.len(),
                "Could not release unsettled outbox events"
            ),
        }
    }

    async fn deliver(&self, event: &OutboxEvent) -> Result<(), MirrorError> {
        let timeout: Duration = self.config.apply_timeout;
        tokio::time::timeout(timeout, apply_event(self.mirror.as_ref(), event))
            .await
            .unwrap_or_else(|_| {
                Err(MirrorError::Timeout(
                    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                ))
            })
    }

    /// Records a throttled delivery. Returns whether the event was failed.
    async fn throttled(&self, event: &OutboxEvent, event_id: i64) -> Result<bool, ReplicationError> {
        let hits: u32 = event.rate_limit_hits.saturating_add(1);
        let now_ms: i64 = now_millis();

        if hits >= self.config.max_rate_limit_hits {
            self.persistence.lock().await.mark_event_failed(
                event_id,
                event.attempts,
                hits,
                now_ms,
                &MirrorError::RateLimited.to_string(),
            )?;
            error!(
                event_id,
                table = %event.entity_table,
                entity_id = %event.entity_id,
                rate_limit_hits = hits,
                "Outbox event failed permanently: mirror kept throttling"
            );
            return Ok(true);
        }

        let available_at: i64 =
            now_ms.saturating_add(duration_ms(self.config.rate_limit_backoff));
        self.persistence.lock().await.reschedule_event(
            event_id,
            event.attempts,
            hits,
            available_at,
            &MirrorError::RateLimited.to_string(),
        )?;
        warn!(
            event_id,
            rate_limit_hits = hits,
            backoff_ms = duration_ms(self.config.rate_limit_backoff),
            "Mirror throttled delivery; pausing batch"
        );
        Ok(false)
    }

    /// Records a failed delivery. Returns whether the event was failed.
    async fn failed_attempt(
        &self,
        event: &OutboxEvent,
        event_id: i64,
        cause: &MirrorError,
    ) -> Result<bool, ReplicationError> {
        let attempts: u32 = event.attempts.saturating_add(1);
        let now_ms: i64 = now_millis();
        let reason: String = cause.to_string();

        if attempts >= self.config.max_attempts {
            self.persistence.lock().await.mark_event_failed(
                event_id,
                attempts,
                event.rate_limit_hits,
                now_ms,
                &reason,
            )?;
            error!(
                event_id,
                table = %event.entity_table,
                entity_id = %event.entity_id,
                attempts,
                error = %reason,
                "Outbox event failed permanently"
            );
            return Ok(true);
        }

        let delay: Duration = retry_delay(&self.config, attempts);
        self.persistence.lock().await.reschedule_event(
            event_id,
            attempts,
            event.rate_limit_hits,
            now_ms.saturating_add(duration_ms(delay)),
            &reason,
        )?;
        warn!(
            event_id,
            attempts,
            backoff_ms = duration_ms(delay),
            error = %reason,
            "Outbox delivery failed; will retry"
        );
        Ok(false)
    }

    /// Reaps, then pushes until shutdown.
    ///
    /// A pass that fails on the store is followed by another reap so no
    /// event stays in flight.
    ///
    /// A batch in progress when shutdown is requested is finished first.
    /// The loop sleeps `poll_interval` whenever a pass delivers nothing.
    pub async fn run(self) {
        info!(
            batch_size = self.config.batch_size,
            max_attempts = self.config.max_attempts,
            "Replication worker started"
        );

        match self.reap().await {
            Ok(0) => {}
            Ok(reaped) => info!(reaped, "Recovered in-flight outbox events"),
            Err(e) => error!(error = %e, "Outbox reaper failed"),
        }

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            let idle: bool = match self.push_once().await {
                Ok(summary) => summary.claimed == 0 || summary.released > 0,
                Err(e) => {
                    error!(error = %e, "Outbox push failed");
                    if let Err(e) = self.reap().await {
                        error!(error = %e, "Outbox reaper failed");
                    }
                    true
                }
            };

            if idle {
                tokio::select! {
                    () = self.shutdown.cancelled() => break,
                    () = tokio::time::sleep(self.config.poll_interval) => {}
                }
            }
        }

        info!("Replication worker stopped");
    }
}

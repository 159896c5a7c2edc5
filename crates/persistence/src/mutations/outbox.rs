// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbox producer and queue state changes.
//!
//! `enqueue` runs inside the transaction of the mutation it records. Every
//! other function here is a queue operation owned by the replication worker.

use diesel::SqliteConnection;
use diesel::prelude::*;
use shiftbook_outbox::{EntitySnapshot, OutboxEvent, OutboxOperation, OutboxStatus};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::data_models::{NewOutboxEvent, OutboxRow};
use crate::diesel_schema::outbox_events;
use crate::error::PersistenceError;

const NON_TERMINAL: [&str; 2] = ["pending", "in_flight"];

fn counter(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Records a pending event for a mutation.
///
/// # Arguments
///
/// * `conn` - The connection holding the mutation's transaction
/// * `operation` - What happened to the entity
/// * `snapshot` - Entity state to replicate
/// * `now_ms` - Enqueue time in unix milliseconds
///
/// # Returns
///
/// The event ID.
///
/// # Errors
///
/// Returns an error if the payload cannot be encoded or the insert fails.
pub fn enqueue(
    conn: &mut SqliteConnection,
    operation: OutboxOperation,
    snapshot: EntitySnapshot,
    now_ms: i64,
) -> Result<i64, PersistenceError> {
    let event: OutboxEvent = OutboxEvent::new(operation, snapshot, now_ms);
    let row: NewOutboxEvent = NewOutboxEvent::from_domain(&event)?;

    let event_id: i64 = diesel::insert_into(outbox_events::table)
        .values(&row)
        .returning(outbox_events::event_id)
        .get_result(conn)?;

    debug!(
        event_id,
        entity_table = %event.entity_table,
        entity_id = %event.entity_id,
        operation = %operation,
        "Enqueued outbox event"
    );

    Ok(event_id)
}

/// Claims up to `limit` deliverable events and marks them in flight.
///
/// Events are taken in `(priority, enqueued_at, event_id)` order. An event is
/// only deliverable when it is the oldest non-terminal event of its entity,
/// so changes to one entity reach the mirror in the order they were made.
///
/// Must run inside an immediate transaction.
///
/// # Errors
///
/// Returns an error if the queries fail or a row cannot be decoded.
pub fn claim_batch(
    conn: &mut SqliteConnection,
    now_ms: i64,
    limit: usize,
) -> Result<Vec<OutboxEvent>, PersistenceError> {
    let open_events: Vec<(i64, String, String)> = outbox_events::table
        .filter(outbox_events::status.eq_any(NON_TERMINAL))
        .order(outbox_events::event_id.asc())
        .select((
            outbox_events::event_id,
            outbox_events::entity_table,
            outbox_events::entity_id,
        ))
        .load(conn)?;

    let mut entity_heads: HashMap<(String, String), i64> = HashMap::new();
    for (event_id, table, entity_id) in open_events {
        entity_heads.entry((table, entity_id)).or_insert(event_id);
    }

    let candidates: Vec<OutboxRow> = outbox_events::table
        .filter(outbox_events::status.eq(OutboxStatus::Pending.as_str()))
        .filter(outbox_events::available_at.le(now_ms))
        .order((
            outbox_events::priority.asc(),
            outbox_events::enqueued_at.asc(),
            outbox_events::event_id.asc(),
        ))
        .select(OutboxRow::as_select())
        .load(conn)?;

    let claimed: Vec<OutboxRow> = candidates
        .into_iter()
        .filter(|row| {
            entity_heads.get(&(row.entity_table.clone(), row.entity_id.clone()))
                == Some(&row.event_id)
        })
        .take(limit)
        .collect();

    if claimed.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = claimed.iter().map(|row| row.event_id).collect();
    diesel::update(outbox_events::table)
        .filter(outbox_events::event_id.eq_any(&ids))
        .set(outbox_events::status.eq(OutboxStatus::InFlight.as_str()))
        .execute(conn)?;

    debug!(count = ids.len(), "Claimed outbox batch");

    claimed
        .into_iter()
        .map(|row| {
            let mut event: OutboxEvent = row.into_domain()?;
            event.status = OutboxStatus::InFlight;
            Ok(event)
        })
        .collect()
}

fn require_row(rows_affected: usize, event_id: i64) -> Result<(), PersistenceError> {
    if rows_affected == 0 {
        return Err(PersistenceError::EventNotFound(event_id));
    }
    Ok(())
}

/// Marks an in-flight event as delivered.
///
/// # Errors
///
/// Returns `PersistenceError::EventNotFound` if no in-flight event has this
/// ID.
pub fn mark_done(
    conn: &mut SqliteConnection,
    event_id: i64,
    now_ms: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(outbox_events::table)
        .filter(outbox_events::event_id.eq(event_id))
        .filter(outbox_events::status.eq(OutboxStatus::InFlight.as_str()))
        .set((
            outbox_events::status.eq(OutboxStatus::Done.as_str()),
            outbox_events::processed_at.eq(Some(now_ms)),
        ))
        .execute(conn)?;
    require_row(rows_affected, event_id)
}

/// Returns an in-flight event to the queue with updated counters and a
/// delay.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `event_id` - The event
/// * `attempts` - Failed attempts so far
/// * `rate_limit_hits` - Throttled deliveries so far
/// * `available_at` - Earliest time the event may be claimed again
/// * `error` - Description of the failure
///
/// # Errors
///
/// Returns `PersistenceError::EventNotFound` if no in-flight event has this
/// ID.
pub fn reschedule(
    conn: &mut SqliteConnection,
    event_id: i64,
    attempts: u32,
    rate_limit_hits: u32,
    available_at: i64,
    error: &str,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(outbox_events::table)
        .filter(outbox_events::event_id.eq(event_id))
        .filter(outbox_events::status.eq(OutboxStatus::InFlight.as_str()))
        .set((
            outbox_events::status.eq(OutboxStatus::Pending.as_str()),
            outbox_events::attempts.eq(counter(attempts)),
            outbox_events::rate_limit_hits.eq(counter(rate_limit_hits)),
            outbox_events::available_at.eq(available_at),
            outbox_events::last_error.eq(Some(error)),
        ))
        .execute(conn)?;
    require_row(rows_affected, event_id)
}

/// Gives up on an in-flight event.
///
/// # Errors
///
/// Returns `PersistenceError::EventNotFound` if no in-flight event has this
/// ID.
pub fn mark_failed(
    conn: &mut SqliteConnection,
    event_id: i64,
    attempts: u32,
    rate_limit_hits: u32,
    now_ms: i64,
    error: &str,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(outbox_events::table)
        .filter(outbox_events::event_id.eq(event_id))
        .filter(outbox_events::status.eq(OutboxStatus::InFlight.as_str()))
        .set((
            outbox_events::status.eq(OutboxStatus::Failed.as_str()),
            outbox_events::attempts.eq(counter(attempts)),
            outbox_events::rate_limit_hits.eq(counter(rate_limit_hits)),
            outbox_events::processed_at.eq(Some(now_ms)),
            outbox_events::last_error.eq(Some(error)),
        ))
        .execute(conn)?;
    require_row(rows_affected, event_id)
}

/// Returns claimed events to pending without touching their counters.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn release(conn: &mut SqliteConnection, event_ids: &[i64]) -> Result<usize, PersistenceError> {
    Ok(diesel::update(outbox_events::table)
        .filter(outbox_events::event_id.eq_any(event_ids))
        .filter(outbox_events::status.eq(OutboxStatus::InFlight.as_str()))
        .set(outbox_events::status.eq(OutboxStatus::Pending.as_str()))
        .execute(conn)?)
}

/// Returns every in-flight event to pending.
///
/// Run at startup: nothing can be in flight before the worker starts, so
/// anything found was abandoned by a previous process.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn reap_in_flight(conn: &mut SqliteConnection) -> Result<usize, PersistenceError> {
    let reaped: usize = diesel::update(outbox_events::table)
        .filter(outbox_events::status.eq(OutboxStatus::InFlight.as_str()))
        .set(outbox_events::status.eq(OutboxStatus::Pending.as_str()))
        .execute(conn)?;

    if reaped > 0 {
        warn!(reaped, "Recovered abandoned in-flight outbox events");
    }
    Ok(reaped)
}

/// Puts a failed event back in the queue with fresh counters.
///
/// A failed event is only retried while nothing newer for the same entity
/// has been queued or delivered. Replaying it would overwrite the mirror
/// row with a stale snapshot.
///
/// Must run inside an immediate transaction.
///
/// # Errors
///
/// Returns `PersistenceError::EventNotFound` if no failed event has this ID,
/// or `PersistenceError::EventSuperseded` if a newer event for the entity is
/// pending, in flight or done.
pub fn retry_failed_event(
    conn: &mut SqliteConnection,
    event_id: i64,
    now_ms: i64,
) -> Result<(), PersistenceError> {
    let (entity_table, entity_id): (String, String) = outbox_events::table
        .filter(outbox_events::event_id.eq(event_id))
        .filter(outbox_events::status.eq(OutboxStatus::Failed.as_str()))
        .select((outbox_events::entity_table, outbox_events::entity_id))
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?;

    let newer: Option<i64> = outbox_events::table
        .filter(outbox_events::entity_table.eq(&entity_table))
        .filter(outbox_events::entity_id.eq(&entity_id))
        .filter(outbox_events::event_id.gt(event_id))
        .filter(outbox_events::status.ne(OutboxStatus::Failed.as_str()))
        .order(outbox_events::event_id.desc())
        .select(outbox_events::event_id)
        .first(conn)
        .optional()?;
    if let Some(by) = newer {
        warn!(
            event_id,
            by,
            %entity_table,
            %entity_id,
            "Refusing to retry superseded outbox event"
        );
        return Err(PersistenceError::EventSuperseded { event_id, by });
    }

    let rows_affected: usize = diesel::update(outbox_events::table)
        .filter(outbox_events::event_id.eq(event_id))
        .filter(outbox_events::status.eq(OutboxStatus::Failed.as_str()))
        .set((
            outbox_events::status.eq(OutboxStatus::Pending.as_str()),
            outbox_events::attempts.eq(0),
            outbox_events::rate_limit_hits.eq(0),
            outbox_events::available_at.eq(now_ms),
            outbox_events::processed_at.eq(None::<i64>),
        ))
        .execute(conn)?;
    require_row(rows_affected, event_id)?;

    info!(event_id, "Failed outbox event queued for retry");
    Ok(())
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Outbox inspection queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use shiftbook_outbox::{EntityTable, OutboxEvent, OutboxStatus};

use crate::data_models::OutboxRow;
use crate::diesel_schema::outbox_events;
use crate::error::PersistenceError;

/// Retrieves an outbox event by ID.
///
/// # Errors
///
/// Returns `PersistenceError::EventNotFound` if no such event exists.
pub fn get_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<OutboxEvent, PersistenceError> {
    outbox_events::table
        .filter(outbox_events::event_id.eq(event_id))
        .select(OutboxRow::as_select())
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?
        .into_domain()
}

/// Number of events in a given status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_by_status(
    conn: &mut SqliteConnection,
    status: OutboxStatus,
) -> Result<i64, PersistenceError> {
    Ok(outbox_events::table
        .filter(outbox_events::status.eq(status.as_str()))
        .count()
        .get_result(conn)?)
}

/// Failed events, most recently processed first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_failed_events(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<OutboxEvent>, PersistenceError> {
    outbox_events::table
        .filter(outbox_events::status.eq(OutboxStatus::Failed.as_str()))
        .order((
            outbox_events::processed_at.desc(),
            outbox_events::event_id.desc(),
        ))
        .limit(limit)
        .select(OutboxRow::as_select())
        .load(conn)?
        .into_iter()
        .map(OutboxRow::into_domain)
        .collect()
}

/// Every event recorded for one entity, in enqueue order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_events_for_entity(
    conn: &mut SqliteConnection,
    table: EntityTable,
    entity_id: &str,
) -> Result<Vec<OutboxEvent>, PersistenceError> {
    outbox_events::table
        .filter(outbox_events::entity_table.eq(table.as_str()))
        .filter(outbox_events::entity_id.eq(entity_id))
        .order(outbox_events::event_id.asc())
        .select(OutboxRow::as_select())
        .load(conn)?
        .into_iter()
        .map(OutboxRow::into_domain)
        .collect()
}

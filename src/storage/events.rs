//! Event scheduling: trainings, games and tournaments

use super::{
    models::*,
    schema::ClubDatabase,
    seasons::{find_team_term_on, require_term},
};
use crate::{
    cli::types::EventId,
    error::{ClubError, Result},
    validation::{normalize_optional, validate_name},
};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

const EVENT_SELECT: &str = "
    SELECT e.id, e.kind, e.title, e.starts_at, e.ends_at, e.term_id, e.team_term_id,
           t.name, e.location, e.notes
    FROM events e
    LEFT JOIN team_terms tt ON tt.id = e.team_term_id
    LEFT JOIN teams t ON t.id = tt.team_id";

fn row_to_event(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        kind: row.get(1)?,
        title: row.get(2)?,
        starts_at: row.get(3)?,
        ends_at: row.get(4)?,
        term_id: row.get(5)?,
        team_term_id: row.get(6)?,
        team_name: row.get(7)?,
        location: row.get(8)?,
        notes: row.get(9)?,
    })
}

pub(crate) fn get_event_on(conn: &Connection, event_id: EventId) -> Result<Event> {
    conn.query_row(
        &format!("{} WHERE e.id = ?", EVENT_SELECT),
        [event_id],
        row_to_event,
    )
    .optional()?
    .ok_or(ClubError::NotFound {
        entity: "Event",
        id: event_id.as_i64(),
    })
}

fn check_times(starts_at: NaiveDateTime, ends_at: NaiveDateTime) -> Result<()> {
    if ends_at <= starts_at {
        return Err(ClubError::validation(
            "event times",
            format!("event ends ({}) before or when it starts ({})", ends_at, starts_at),
        ));
    }
    Ok(())
}

fn check_in_term(term: &Term, starts_at: NaiveDateTime) -> Result<()> {
    let date = starts_at.date();
    if !term.contains(date) {
        return Err(ClubError::validation(
            "event date",
            format!(
                "{} is outside {} ({} to {})",
                date, term.name, term.starts_on, term.ends_on
            ),
        ));
    }
    Ok(())
}

impl ClubDatabase {
    /// Schedule an event.
    ///
    /// Without an explicit term the event lands in the term covering its
    /// start date. A team, when given, must be enrolled in that term.
    pub fn create_event(&mut self, new: &NewEvent) -> Result<Event> {
        let title = validate_name("event title", &new.title)?;
        check_times(new.starts_at, new.ends_at)?;

        let term = match new.term_id {
            Some(term_id) => {
                let term = require_term(&self.conn, term_id)?;
                check_in_term(&term, new.starts_at)?;
                term
            }
            None => {
                let date = new.starts_at.date();
                self.term_for_date(date)?
                    .ok_or(ClubError::NoTermForDate {
                        date: date.to_string(),
                    })?
            }
        };

        let team_term_id = match new.team_id {
            Some(team_id) => {
                let team_term = find_team_term_on(&self.conn, team_id, term.id)?.ok_or(
                    ClubError::TeamNotEnrolled {
                        team_id: team_id.as_i64(),
                        term_id: term.id.as_i64(),
                    },
                )?;
                Some(team_term.id)
            }
            None => None,
        };

        self.conn.execute(
            "INSERT INTO events (kind, title, starts_at, ends_at, term_id, team_term_id, location, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.kind,
                title,
                new.starts_at,
                new.ends_at,
                term.id,
                team_term_id,
                normalize_optional(new.location.as_deref()),
                normalize_optional(new.notes.as_deref())
            ],
        )?;
        let id = EventId::new(self.conn.last_insert_rowid());
        info!(event_id = %id, kind = %new.kind, "Scheduled {} in {}", title, term.name);
        self.get_event(id)
    }

    pub fn get_event(&self, event_id: EventId) -> Result<Event> {
        get_event_on(&self.conn, event_id)
    }

    /// Events matching every filter field, in start order.
    pub fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let mut query = format!("{} WHERE 1 = 1", EVENT_SELECT);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(term_id) = filter.term_id {
            query.push_str(" AND e.term_id = ?");
            params.push(Box::new(term_id));
        }
        if let Some(team_id) = filter.team_id {
            query.push_str(" AND tt.team_id = ?");
            params.push(Box::new(team_id));
        }
        if let Some(from) = filter.from {
            query.push_str(" AND date(e.starts_at) >= ?");
            params.push(Box::new(from));
        }
        if let Some(to) = filter.to {
            query.push_str(" AND date(e.starts_at) <= ?");
            params.push(Box::new(to));
        }
        query.push_str(" ORDER BY e.starts_at, e.id");

        let mut stmt = self.conn.prepare(&query)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(&param_refs[..], row_to_event)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Move an event within its term; its term and team stay as they are.
    pub fn reschedule_event(
        &mut self,
        event_id: EventId,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
    ) -> Result<Event> {
        check_times(starts_at, ends_at)?;
        let event = self.get_event(event_id)?;
        let term = require_term(&self.conn, event.term_id)?;
        check_in_term(&term, starts_at)?;

        self.conn.execute(
            "UPDATE events SET starts_at = ?, ends_at = ? WHERE id = ?",
            params![starts_at, ends_at, event_id],
        )?;
        self.get_event(event_id)
    }

    /// Delete an event together with its attendance records.
    pub fn remove_event(&mut self, event_id: EventId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [event_id])?;
        if deleted == 0 {
            return Err(ClubError::NotFound {
                entity: "Event",
                id: event_id.as_i64(),
            });
        }
        info!(event_id = %event_id, "Removed event");
        Ok(())
    }
}

//! Taking the roll: attendance per event and per term

use super::{events::get_event_on, models::*, schema::ClubDatabase, seasons::require_term};
use crate::{
    cli::types::{AttendanceStatus, EventId, PlayerId, PlayerTermId, TeamId, TermId},
    error::{ClubError, Result},
    validation::normalize_optional,
};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use tracing::{debug, info};

const UPSERT_ATTENDANCE: &str = "
    INSERT INTO attendance (event_id, player_term_id, status, notes) VALUES (?, ?, ?, ?)
    ON CONFLICT (event_id, player_term_id) DO UPDATE SET
        status = excluded.status,
        notes = COALESCE(excluded.notes, attendance.notes),
        recorded_at = CURRENT_TIMESTAMP";

/// Players expected at `event` with whatever has been recorded so far.
///
/// A team event expects the team's members for the term; a club-wide event
/// expects every registration in the term that has not been withdrawn.
/// Anyone already marked stays on the sheet even if they have since left.
fn roll_sheet_on(conn: &Connection, event: &Event) -> Result<Vec<RollEntry>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, pt.id, p.first_name, p.last_name, a.status, a.notes
         FROM player_terms pt
         JOIN players p ON p.id = pt.player_id
         LEFT JOIN attendance a ON a.player_term_id = pt.id AND a.event_id = ?1
         WHERE a.id IS NOT NULL
            OR (?2 IS NOT NULL
                AND pt.id IN (SELECT player_term_id FROM memberships WHERE team_term_id = ?2))
            OR (?2 IS NULL AND pt.term_id = ?3 AND pt.status != 'withdrawn')
         ORDER BY p.last_name COLLATE NOCASE, p.first_name COLLATE NOCASE, p.id",
    )?;

    let rows = stmt.query_map(
        params![event.id, event.team_term_id, event.term_id],
        |row| {
            Ok(RollEntry {
                player_id: row.get(0)?,
                player_term_id: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                status: row.get(4)?,
                notes: row.get(5)?,
            })
        },
    )?;

    let mut sheet = Vec::new();
    for row in rows {
        sheet.push(row?);
    }
    Ok(sheet)
}

fn apply_marks(conn: &Connection, event: &Event, marks: &[RollMark]) -> Result<usize> {
    let on_roll: HashMap<PlayerId, PlayerTermId> = roll_sheet_on(conn, event)?
        .into_iter()
        .map(|entry| (entry.player_id, entry.player_term_id))
        .collect();

    let mut upsert = conn.prepare(UPSERT_ATTENDANCE)?;
    for mark in marks {
        let player_term_id = on_roll
            .get(&mark.player_id)
            .ok_or(ClubError::NotOnRoll {
                player_id: mark.player_id.as_i64(),
                event_id: event.id.as_i64(),
            })?;
        upsert.execute(params![
            event.id,
            player_term_id,
            mark.status,
            normalize_optional(mark.notes.as_deref())
        ])?;
    }
    Ok(marks.len())
}

impl ClubDatabase {
    pub fn roll_sheet(&self, event_id: EventId) -> Result<Vec<RollEntry>> {
        let event = get_event_on(&self.conn, event_id)?;
        roll_sheet_on(&self.conn, &event)
    }

    /// Record one player's attendance, replacing any earlier mark.
    pub fn mark_attendance(&mut self, event_id: EventId, mark: &RollMark) -> Result<()> {
        self.record_roll(event_id, std::slice::from_ref(mark))?;
        Ok(())
    }

    /// Record several marks at once; either all are stored or none.
    pub fn record_roll(&mut self, event_id: EventId, marks: &[RollMark]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let event = get_event_on(&tx, event_id)?;
        let recorded = apply_marks(&tx, &event, marks)?;
        tx.commit()?;

        debug!(event_id = %event_id, recorded, "Recorded roll");
        Ok(recorded)
    }

    /// Give every player not yet marked for the event the same status.
    pub fn fill_roll(&mut self, event_id: EventId, status: AttendanceStatus) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let event = get_event_on(&tx, event_id)?;
        let marks: Vec<RollMark> = roll_sheet_on(&tx, &event)?
            .into_iter()
            .filter(|entry| entry.status.is_none())
            .map(|entry| RollMark {
                player_id: entry.player_id,
                status,
                notes: None,
            })
            .collect();
        let filled = apply_marks(&tx, &event, &marks)?;
        tx.commit()?;

        info!(event_id = %event_id, filled, status = %status, "Filled remaining roll");
        Ok(filled)
    }

    /// Per-player attendance counts over a term.
    ///
    /// With a team, only that team's members and that team's events count.
    pub fn attendance_summary(
        &self,
        term_id: TermId,
        team_id: Option<TeamId>,
    ) -> Result<Vec<AttendanceSummary>> {
        require_term(&self.conn, term_id)?;
        let team_term_id = match team_id {
            Some(team_id) => Some(self.get_team_term(team_id, term_id)?.id),
            None => None,
        };

        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.first_name, p.last_name,
                    COUNT(CASE WHEN a.status = 'present' THEN 1 END),
                    COUNT(CASE WHEN a.status = 'late' THEN 1 END),
                    COUNT(CASE WHEN a.status = 'absent' THEN 1 END)
             FROM player_terms pt
             JOIN players p ON p.id = pt.player_id
             LEFT JOIN attendance a ON a.player_term_id = pt.id
                  AND a.event_id IN (SELECT e.id FROM events e
                                     WHERE e.term_id = ?1
                                       AND (?2 IS NULL OR e.team_term_id = ?2))
             WHERE pt.term_id = ?1
               AND (?2 IS NULL
                    OR pt.id IN (SELECT player_term_id FROM memberships WHERE team_term_id = ?2))
             GROUP BY p.id, p.first_name, p.last_name
             ORDER BY p.last_name COLLATE NOCASE, p.first_name COLLATE NOCASE",
        )?;

        let rows = stmt.query_map(params![term_id, team_term_id], |row| {
            Ok(AttendanceSummary::new(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?;

        let mut summary = Vec::new();
        for row in rows {
            summary.push(row?);
        }
        Ok(summary)
    }
}

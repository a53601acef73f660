//! Teams, terms, and the term-scoped rows that tie them to players

use super::{models::*, roster::require_player, schema::ClubDatabase};
use crate::{
    cli::types::{Money, PlayerId, PlayerTermId, RegistrationStatus, TeamId, TeamTermId, TermId},
    error::{ClubError, Result},
    validation::{normalize_optional, validate_name},
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, info};

const TEAM_TERM_SELECT: &str = "
    SELECT tt.id, tt.team_id, tt.term_id, t.name, tm.name, tt.fee_cents, tt.fee_due_on
    FROM team_terms tt
    JOIN teams t ON t.id = tt.team_id
    JOIN terms tm ON tm.id = tt.term_id";

fn row_to_term(row: &Row) -> rusqlite::Result<Term> {
    Ok(Term {
        id: row.get(0)?,
        name: row.get(1)?,
        starts_on: row.get(2)?,
        ends_on: row.get(3)?,
    })
}

fn row_to_team_term(row: &Row) -> rusqlite::Result<TeamTerm> {
    Ok(TeamTerm {
        id: row.get(0)?,
        team_id: row.get(1)?,
        term_id: row.get(2)?,
        team_name: row.get(3)?,
        term_name: row.get(4)?,
        fee: row.get(5)?,
        fee_due_on: row.get(6)?,
    })
}

fn row_to_player_term(row: &Row) -> rusqlite::Result<PlayerTerm> {
    Ok(PlayerTerm {
        id: row.get(0)?,
        player_id: row.get(1)?,
        term_id: row.get(2)?,
        status: row.get(3)?,
        registered_at: row.get(4)?,
    })
}

/// Map a UNIQUE violation to a readable conflict, pass anything else through.
fn unique_conflict(err: rusqlite::Error, message: String) -> ClubError {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            ClubError::Conflict { message }
        }
        other => other.into(),
    }
}

pub(crate) fn require_team(conn: &Connection, team_id: TeamId) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM teams WHERE id = ?)",
        [team_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(ClubError::NotFound {
            entity: "Team",
            id: team_id.as_i64(),
        })
    }
}

pub(crate) fn require_term(conn: &Connection, term_id: TermId) -> Result<Term> {
    conn.query_row(
        "SELECT id, name, starts_on, ends_on FROM terms WHERE id = ?",
        [term_id],
        row_to_term,
    )
    .optional()?
    .ok_or(ClubError::NotFound {
        entity: "Term",
        id: term_id.as_i64(),
    })
}

pub(crate) fn find_team_term_on(
    conn: &Connection,
    team_id: TeamId,
    term_id: TermId,
) -> Result<Option<TeamTerm>> {
    let team_term = conn
        .query_row(
            &format!("{} WHERE tt.team_id = ? AND tt.term_id = ?", TEAM_TERM_SELECT),
            params![team_id, term_id],
            row_to_team_term,
        )
        .optional()?;
    Ok(team_term)
}

/// Insert the team-term row if it is missing and return it either way.
pub(crate) fn ensure_team_term_on(
    conn: &Connection,
    team_id: TeamId,
    term_id: TermId,
) -> Result<(TeamTerm, bool)> {
    require_team(conn, team_id)?;
    require_term(conn, term_id)?;

    let inserted = conn.execute(
        "INSERT INTO team_terms (team_id, term_id) VALUES (?, ?)
         ON CONFLICT (team_id, term_id) DO NOTHING",
        params![team_id, term_id],
    )? > 0;

    let team_term = find_team_term_on(conn, team_id, term_id)?.ok_or(ClubError::Storage {
        message: format!("team {} / term {} row missing after insert", team_id, term_id),
    })?;
    Ok((team_term, inserted))
}

pub(crate) fn find_player_term_on(
    conn: &Connection,
    player_id: PlayerId,
    term_id: TermId,
) -> Result<Option<PlayerTerm>> {
    let player_term = conn
        .query_row(
            "SELECT id, player_id, term_id, status, registered_at
             FROM player_terms WHERE player_id = ? AND term_id = ?",
            params![player_id, term_id],
            row_to_player_term,
        )
        .optional()?;
    Ok(player_term)
}

impl ClubDatabase {
    pub fn add_team(&mut self, name: &str, age_group: Option<&str>) -> Result<Team> {
        let name = validate_name("team name", name)?;
        let age_group = normalize_optional(age_group);

        self.conn
            .execute(
                "INSERT INTO teams (name, age_group) VALUES (?, ?)",
                params![name, age_group],
            )
            .map_err(|e| unique_conflict(e, format!("A team named '{}' already exists", name)))?;

        let id = TeamId::new(self.conn.last_insert_rowid());
        info!(team_id = %id, "Added team {}", name);
        Ok(Team {
            id,
            name,
            age_group,
        })
    }

    pub fn get_team(&self, team_id: TeamId) -> Result<Team> {
        self.conn
            .query_row(
                "SELECT id, name, age_group FROM teams WHERE id = ?",
                [team_id],
                |row| {
                    Ok(Team {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        age_group: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(ClubError::NotFound {
                entity: "Team",
                id: team_id.as_i64(),
            })
    }

    pub fn list_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, age_group FROM teams ORDER BY name COLLATE NOCASE")?;
        let rows = stmt.query_map([], |row| {
            Ok(Team {
                id: row.get(0)?,
                name: row.get(1)?,
                age_group: row.get(2)?,
            })
        })?;

        let mut teams = Vec::new();
        for row in rows {
            teams.push(row?);
        }
        Ok(teams)
    }

    /// Add a term; the end date may equal but not precede the start date.
    pub fn add_term(&mut self, name: &str, starts_on: NaiveDate, ends_on: NaiveDate) -> Result<Term> {
        let name = validate_name("term name", name)?;
        if ends_on < starts_on {
            return Err(ClubError::validation(
                "term dates",
                format!("term ends ({}) before it starts ({})", ends_on, starts_on),
            ));
        }

        self.conn
            .execute(
                "INSERT INTO terms (name, starts_on, ends_on) VALUES (?, ?, ?)",
                params![name, starts_on, ends_on],
            )
            .map_err(|e| unique_conflict(e, format!("A term named '{}' already exists", name)))?;

        let id = TermId::new(self.conn.last_insert_rowid());
        info!(term_id = %id, "Added term {} ({} to {})", name, starts_on, ends_on);
        Ok(Term {
            id,
            name,
            starts_on,
            ends_on,
        })
    }

    pub fn get_term(&self, term_id: TermId) -> Result<Term> {
        require_term(&self.conn, term_id)
    }

    /// All terms, most recent first.
    pub fn list_terms(&self) -> Result<Vec<Term>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, starts_on, ends_on FROM terms ORDER BY starts_on DESC, id DESC",
        )?;
        let rows = stmt.query_map([], row_to_term)?;

        let mut terms = Vec::new();
        for row in rows {
            terms.push(row?);
        }
        Ok(terms)
    }

    /// The term covering `date`. Overlapping terms resolve to the latest start.
    pub fn term_for_date(&self, date: NaiveDate) -> Result<Option<Term>> {
        let term = self
            .conn
            .query_row(
                "SELECT id, name, starts_on, ends_on FROM terms
                 WHERE starts_on <= ?1 AND ends_on >= ?1
                 ORDER BY starts_on DESC, id DESC
                 LIMIT 1",
                [date],
                row_to_term,
            )
            .optional()?;
        Ok(term)
    }

    /// Enrol a team in a term, creating the team-term row if needed, and set its fee.
    pub fn enrol_team(
        &mut self,
        team_id: TeamId,
        term_id: TermId,
        fee: Option<Money>,
        fee_due_on: Option<NaiveDate>,
    ) -> Result<TeamTerm> {
        let tx = self.conn.transaction()?;
        let (team_term, created) = ensure_team_term_on(&tx, team_id, term_id)?;

        if fee.is_some() || fee_due_on.is_some() {
            tx.execute(
                "UPDATE team_terms
                 SET fee_cents = COALESCE(?, fee_cents), fee_due_on = COALESCE(?, fee_due_on)
                 WHERE id = ?",
                params![fee, fee_due_on, team_term.id],
            )?;
        }
        let team_term = find_team_term_on(&tx, team_id, term_id)?.unwrap_or(team_term);
        tx.commit()?;

        if created {
            info!(team_term_id = %team_term.id, "Enrolled {} in {}", team_term.team_name, team_term.term_name);
        } else {
            debug!(team_term_id = %team_term.id, "Team already enrolled; reusing row");
        }
        Ok(team_term)
    }

    pub fn find_team_term(&self, team_id: TeamId, term_id: TermId) -> Result<Option<TeamTerm>> {
        find_team_term_on(&self.conn, team_id, term_id)
    }

    /// The team-term row, or `TeamNotEnrolled` when the team has not joined the term.
    pub fn get_team_term(&self, team_id: TeamId, term_id: TermId) -> Result<TeamTerm> {
        require_team(&self.conn, team_id)?;
        require_term(&self.conn, term_id)?;
        self.find_team_term(team_id, term_id)?
            .ok_or(ClubError::TeamNotEnrolled {
                team_id: team_id.as_i64(),
                term_id: term_id.as_i64(),
            })
    }

    /// Teams enrolled in a term, by team name.
    pub fn team_terms_for_term(&self, term_id: TermId) -> Result<Vec<TeamTerm>> {
        require_term(&self.conn, term_id)?;
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE tt.term_id = ? ORDER BY t.name COLLATE NOCASE",
            TEAM_TERM_SELECT
        ))?;
        let rows = stmt.query_map([term_id], row_to_team_term)?;

        let mut team_terms = Vec::new();
        for row in rows {
            team_terms.push(row?);
        }
        Ok(team_terms)
    }

    /// Register a player for a term.
    ///
    /// Reuses an existing registration; `status`, when given, overwrites the
    /// stored status either way.
    pub fn register_player(
        &mut self,
        player_id: PlayerId,
        term_id: TermId,
        status: Option<RegistrationStatus>,
    ) -> Result<PlayerTerm> {
        let tx = self.conn.transaction()?;
        require_player(&tx, player_id)?;
        require_term(&tx, term_id)?;

        tx.execute(
            "INSERT INTO player_terms (player_id, term_id, status) VALUES (?, ?, ?)
             ON CONFLICT (player_id, term_id) DO NOTHING",
            params![player_id, term_id, status.unwrap_or_default()],
        )?;
        if let Some(status) = status {
            tx.execute(
                "UPDATE player_terms SET status = ? WHERE player_id = ? AND term_id = ?",
                params![status, player_id, term_id],
            )?;
        }

        let player_term =
            find_player_term_on(&tx, player_id, term_id)?.ok_or(ClubError::Storage {
                message: format!(
                    "player {} / term {} row missing after insert",
                    player_id, term_id
                ),
            })?;
        tx.commit()?;

        debug!(player_term_id = %player_term.id, status = %player_term.status, "Registered player");
        Ok(player_term)
    }

    pub fn find_player_term(
        &self,
        player_id: PlayerId,
        term_id: TermId,
    ) -> Result<Option<PlayerTerm>> {
        find_player_term_on(&self.conn, player_id, term_id)
    }

    pub fn set_registration_status(
        &mut self,
        player_term_id: PlayerTermId,
        status: RegistrationStatus,
    ) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE player_terms SET status = ? WHERE id = ?",
            params![status, player_term_id],
        )?;
        if updated == 0 {
            return Err(ClubError::NotFound {
                entity: "Registration",
                id: player_term_id.as_i64(),
            });
        }
        Ok(())
    }

    /// Registrations for a term ordered by player name, optionally by status.
    pub fn registrations_for_term(
        &self,
        term_id: TermId,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<Registration>> {
        require_term(&self.conn, term_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT pt.id, p.id, p.first_name || ' ' || p.last_name, tm.id, tm.name, pt.status
             FROM player_terms pt
             JOIN players p ON p.id = pt.player_id
             JOIN terms tm ON tm.id = pt.term_id
             WHERE pt.term_id = ?1 AND (?2 IS NULL OR pt.status = ?2)
             ORDER BY p.last_name COLLATE NOCASE, p.first_name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(params![term_id, status], row_to_registration)?;

        let mut registrations = Vec::new();
        for row in rows {
            registrations.push(row?);
        }
        Ok(registrations)
    }

    /// Every term a player is registered in, most recent first.
    pub fn registrations_for_player(&self, player_id: PlayerId) -> Result<Vec<Registration>> {
        require_player(&self.conn, player_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT pt.id, p.id, p.first_name || ' ' || p.last_name, tm.id, tm.name, pt.status
             FROM player_terms pt
             JOIN players p ON p.id = pt.player_id
             JOIN terms tm ON tm.id = pt.term_id
             WHERE pt.player_id = ?
             ORDER BY tm.starts_on DESC",
        )?;
        let rows = stmt.query_map([player_id], row_to_registration)?;

        let mut registrations = Vec::new();
        for row in rows {
            registrations.push(row?);
        }
        Ok(registrations)
    }
}

fn row_to_registration(row: &Row) -> rusqlite::Result<Registration> {
    Ok(Registration {
        player_term_id: row.get(0)?,
        player_id: row.get(1)?,
        player_name: row.get(2)?,
        term_id: row.get(3)?,
        term_name: row.get(4)?,
        status: row.get(5)?,
    })
}

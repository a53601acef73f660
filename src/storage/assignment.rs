//! Bulk team assignment and team rosters
//!
//! Assigning a batch of players to a team for a term touches four tables:
//!
//! 1. `team_terms`: the team's row for the term is created if missing.
//! 2. `player_terms`: existing registrations for the batch are looked up in
//!    one query and only the missing ones are inserted.
//! 3. `memberships`: one row per (player_term, team_term), upserted so a
//!    repeated assignment only changes the role.
//! 4. `team_fees`: each member gets a fee row priced at the team-term fee.
//!
//! The whole batch runs in one transaction; an unknown id rolls it back.

use super::{
    models::*,
    schema::ClubDatabase,
    seasons::{
        ensure_team_term_on, find_player_term_on, find_team_term_on, require_team, require_term,
    },
};
use crate::{
    cli::types::{PlayerId, PlayerTermId, Role, TeamId, TeamTermId, TermId},
    error::{ClubError, Result},
};
use rusqlite::{params, params_from_iter, Connection};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// `?, ?, ?` with `n` placeholders for an `IN (...)` clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Existing registrations in `term_id` for the given players.
fn existing_player_terms(
    conn: &Connection,
    term_id: TermId,
    player_ids: &[PlayerId],
) -> Result<HashMap<PlayerId, PlayerTermId>> {
    let sql = format!(
        "SELECT player_id, id FROM player_terms WHERE term_id = ? AND player_id IN ({})",
        placeholders(player_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;

    let mut bound: Vec<i64> = Vec::with_capacity(player_ids.len() + 1);
    bound.push(term_id.as_i64());
    bound.extend(player_ids.iter().map(PlayerId::as_i64));

    let rows = stmt.query_map(params_from_iter(bound), |row| {
        Ok((row.get::<_, PlayerId>(0)?, row.get::<_, PlayerTermId>(1)?))
    })?;

    let mut found = HashMap::new();
    for row in rows {
        let (player_id, player_term_id) = row?;
        found.insert(player_id, player_term_id);
    }
    Ok(found)
}

/// Fail with the first id in `player_ids` that has no player row.
fn require_players(conn: &Connection, player_ids: &[PlayerId]) -> Result<()> {
    let sql = format!(
        "SELECT id FROM players WHERE id IN ({})",
        placeholders(player_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(player_ids.iter()), |row| {
        row.get::<_, PlayerId>(0)
    })?;

    let mut known = BTreeSet::new();
    for row in rows {
        known.insert(row?);
    }

    match player_ids.iter().find(|id| !known.contains(id)) {
        Some(missing) => Err(ClubError::NotFound {
            entity: "Player",
            id: missing.as_i64(),
        }),
        None => Ok(()),
    }
}

/// Current roles keyed by player_term for one team-term.
fn existing_roles(
    conn: &Connection,
    team_term_id: TeamTermId,
) -> Result<HashMap<PlayerTermId, Role>> {
    let mut stmt =
        conn.prepare("SELECT player_term_id, role FROM memberships WHERE team_term_id = ?")?;
    let rows = stmt.query_map([team_term_id], |row| {
        Ok((row.get::<_, PlayerTermId>(0)?, row.get::<_, Role>(1)?))
    })?;

    let mut roles = HashMap::new();
    for row in rows {
        let (player_term_id, role) = row?;
        roles.insert(player_term_id, role);
    }
    Ok(roles)
}

impl ClubDatabase {
    /// Assign players to a team for a term with the given role.
    ///
    /// Duplicate ids in `player_ids` count once. Running the same assignment
    /// twice leaves the database unchanged and reports every player as
    /// unchanged the second time.
    pub fn assign_players(
        &mut self,
        team_id: TeamId,
        term_id: TermId,
        player_ids: &[PlayerId],
        role: Role,
    ) -> Result<AssignmentOutcome> {
        let mut seen = BTreeSet::new();
        let batch: Vec<PlayerId> = player_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if batch.is_empty() {
            return Err(ClubError::validation("players", "no players selected"));
        }

        let tx = self.conn.transaction()?;
        require_players(&tx, &batch)?;
        let (team_term, _) = ensure_team_term_on(&tx, team_id, term_id)?;

        let mut player_terms = existing_player_terms(&tx, term_id, &batch)?;
        let missing: Vec<PlayerId> = batch
            .iter()
            .copied()
            .filter(|id| !player_terms.contains_key(id))
            .collect();

        {
            let mut insert = tx.prepare(
                "INSERT INTO player_terms (player_id, term_id, status) VALUES (?, ?, 'registered')",
            )?;
            for player_id in &missing {
                let rowid = insert.insert(params![player_id, term_id])?;
                player_terms.insert(*player_id, PlayerTermId::new(rowid));
            }
        }
        debug!(
            term_id = %term_id,
            existing = batch.len() - missing.len(),
            created = missing.len(),
            "Resolved player registrations"
        );

        let roles_before = existing_roles(&tx, team_term.id)?;
        let mut outcome = AssignmentOutcome {
            team_term_id: Some(team_term.id),
            player_terms_created: missing.len(),
            ..AssignmentOutcome::default()
        };

        {
            let mut upsert = tx.prepare(
                "INSERT INTO memberships (player_term_id, team_term_id, role) VALUES (?, ?, ?)
                 ON CONFLICT (player_term_id, team_term_id) DO UPDATE SET role = excluded.role",
            )?;
            let mut fee = tx.prepare(
                "INSERT INTO team_fees (player_term_id, team_term_id, amount_due_cents)
                 VALUES (?, ?, ?)
                 ON CONFLICT (player_term_id, team_term_id) DO NOTHING",
            )?;

            for player_id in &batch {
                let player_term_id = player_terms[player_id];
                upsert.execute(params![player_term_id, team_term.id, role])?;
                fee.execute(params![player_term_id, team_term.id, team_term.fee])?;

                match roles_before.get(&player_term_id) {
                    None => outcome.memberships_added += 1,
                    Some(previous) if *previous != role => outcome.roles_changed += 1,
                    Some(_) => outcome.unchanged += 1,
                }
            }
        }

        tx.commit()?;
        info!(
            team_term_id = %team_term.id,
            added = outcome.memberships_added,
            roles_changed = outcome.roles_changed,
            unchanged = outcome.unchanged,
            "Assigned players to {} for {}",
            team_term.team_name,
            team_term.term_name
        );
        Ok(outcome)
    }

    /// Remove a player from a team for a term.
    ///
    /// The player's fee row for that team goes too unless payments exist
    /// against it. Returns whether a membership was removed.
    pub fn unassign_player(
        &mut self,
        team_id: TeamId,
        term_id: TermId,
        player_id: PlayerId,
    ) -> Result<bool> {
        let tx = self.conn.transaction()?;
        let team_term = match find_team_term_on(&tx, team_id, term_id)? {
            Some(team_term) => team_term,
            None => return Ok(false),
        };
        let player_term = match find_player_term_on(&tx, player_id, term_id)? {
            Some(player_term) => player_term,
            None => return Ok(false),
        };

        let removed = tx.execute(
            "DELETE FROM memberships WHERE player_term_id = ? AND team_term_id = ?",
            params![player_term.id, team_term.id],
        )? > 0;
        tx.execute(
            "DELETE FROM team_fees
             WHERE player_term_id = ?1 AND team_term_id = ?2
               AND NOT EXISTS (SELECT 1 FROM payments WHERE team_fee_id = team_fees.id)",
            params![player_term.id, team_term.id],
        )?;
        tx.commit()?;

        if removed {
            info!(player_id = %player_id, team_term_id = %team_term.id, "Unassigned player");
        }
        Ok(removed)
    }

    /// Members of a team for a term, captains first, then by name.
    pub fn team_roster(&self, team_id: TeamId, term_id: TermId) -> Result<Vec<RosterEntry>> {
        require_team(&self.conn, team_id)?;
        require_term(&self.conn, term_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT m.id, p.id, pt.id, p.first_name, p.last_name, m.role, pt.status
             FROM memberships m
             JOIN team_terms tt ON tt.id = m.team_term_id
             JOIN player_terms pt ON pt.id = m.player_term_id
             JOIN players p ON p.id = pt.player_id
             WHERE tt.team_id = ? AND tt.term_id = ?
             ORDER BY m.role = 'captain' DESC,
                      p.last_name COLLATE NOCASE, p.first_name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(params![team_id, term_id], |row| {
            Ok(RosterEntry {
                membership_id: row.get(0)?,
                player_id: row.get(1)?,
                player_term_id: row.get(2)?,
                first_name: row.get(3)?,
                last_name: row.get(4)?,
                role: row.get(5)?,
                status: row.get(6)?,
            })
        })?;

        let mut roster = Vec::new();
        for row in rows {
            roster.push(row?);
        }
        Ok(roster)
    }
}

#[cfg(test)]
mod tests {
    use super::placeholders;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}

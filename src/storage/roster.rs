//! Players and their guardians

use super::{models::*, schema::ClubDatabase};
use crate::{
    cli::types::{time::today, GuardianId, PlayerId},
    error::{ClubError, Result},
    validation::{
        check_upload, normalize_optional, validate_date_of_birth, validate_email, validate_name,
        validate_phone,
    },
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::{debug, info};

const PLAYER_COLUMNS: &str =
    "id, first_name, last_name, date_of_birth, email, phone, photo_path, notes";

fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        photo_path: row.get(6)?,
        notes: row.get(7)?,
    })
}

pub(crate) fn require_player(conn: &Connection, player_id: PlayerId) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM players WHERE id = ?)",
        [player_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(ClubError::NotFound {
            entity: "Player",
            id: player_id.as_i64(),
        })
    }
}

fn require_guardian(conn: &Connection, guardian_id: GuardianId) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM guardians WHERE id = ?)",
        [guardian_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(ClubError::NotFound {
            entity: "Guardian",
            id: guardian_id.as_i64(),
        })
    }
}

/// Validated copy of the optional contact fields.
fn contact_fields(
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<(Option<String>, Option<String>)> {
    let email = normalize_optional(email)
        .map(|e| validate_email(&e))
        .transpose()?;
    let phone = normalize_optional(phone)
        .map(|p| validate_phone(&p))
        .transpose()?;
    Ok((email, phone))
}

fn link_guardian_on(
    conn: &Connection,
    player_id: PlayerId,
    guardian_id: GuardianId,
    relationship: Option<&str>,
    primary: bool,
) -> Result<()> {
    if primary {
        conn.execute(
            "UPDATE player_guardians SET is_primary = 0 WHERE player_id = ? AND guardian_id != ?",
            params![player_id, guardian_id],
        )?;
    }
    conn.execute(
        "INSERT INTO player_guardians (player_id, guardian_id, relationship, is_primary)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (player_id, guardian_id) DO UPDATE SET
             relationship = COALESCE(excluded.relationship, player_guardians.relationship),
             is_primary = excluded.is_primary",
        params![
            player_id,
            guardian_id,
            normalize_optional(relationship),
            primary
        ],
    )?;
    Ok(())
}

impl ClubDatabase {
    /// Validate and insert a new player.
    ///
    /// Nothing is written when validation fails.
    pub fn add_player(&mut self, new: &NewPlayer) -> Result<Player> {
        let first_name = validate_name("first name", &new.first_name)?;
        let last_name = validate_name("last name", &new.last_name)?;
        let (email, phone) = contact_fields(new.email.as_deref(), new.phone.as_deref())?;
        let date_of_birth = new
            .date_of_birth
            .map(|dob| validate_date_of_birth(dob, today()))
            .transpose()?;

        self.conn.execute(
            "INSERT INTO players (first_name, last_name, date_of_birth, email, phone, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                first_name,
                last_name,
                date_of_birth,
                email,
                phone,
                normalize_optional(new.notes.as_deref())
            ],
        )?;
        let id = PlayerId::new(self.conn.last_insert_rowid());
        info!(player_id = %id, "Added player {} {}", first_name, last_name);
        self.get_player(id)
    }

    pub fn find_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        let player = self
            .conn
            .query_row(
                &format!("SELECT {} FROM players WHERE id = ?", PLAYER_COLUMNS),
                [player_id],
                row_to_player,
            )
            .optional()?;
        Ok(player)
    }

    pub fn get_player(&self, player_id: PlayerId) -> Result<Player> {
        self.find_player(player_id)?.ok_or(ClubError::NotFound {
            entity: "Player",
            id: player_id.as_i64(),
        })
    }

    /// List players ordered by surname, optionally matching a name fragment.
    pub fn list_players(&self, search: Option<&str>) -> Result<Vec<Player>> {
        let search = normalize_optional(search);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM players
             WHERE ?1 IS NULL
                OR first_name LIKE '%' || ?1 || '%'
                OR last_name LIKE '%' || ?1 || '%'
                OR (first_name || ' ' || last_name) LIKE '%' || ?1 || '%'
             ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id",
            PLAYER_COLUMNS
        ))?;

        let rows = stmt.query_map([search], row_to_player)?;
        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }
        Ok(players)
    }

    /// Apply a partial update, validating every supplied field.
    ///
    /// Fields left as `None` keep their value. A blank email, phone or notes
    /// clears it.
    pub fn update_player(&mut self, player_id: PlayerId, update: &PlayerUpdate) -> Result<Player> {
        let current = self.get_player(player_id)?;

        let first_name = match &update.first_name {
            Some(name) => validate_name("first name", name)?,
            None => current.first_name,
        };
        let last_name = match &update.last_name {
            Some(name) => validate_name("last name", name)?,
            None => current.last_name,
        };
        let (email, phone) = contact_fields(update.email.as_deref(), update.phone.as_deref())?;
        let email = if update.email.is_some() { email } else { current.email };
        let phone = if update.phone.is_some() { phone } else { current.phone };
        let notes = match update.notes.as_deref() {
            Some(notes) => normalize_optional(Some(notes)),
            None => current.notes,
        };
        let date_of_birth = update
            .date_of_birth
            .map(|dob| validate_date_of_birth(dob, today()))
            .transpose()?
            .or(current.date_of_birth);

        self.conn.execute(
            "UPDATE players
             SET first_name = ?, last_name = ?, date_of_birth = ?, email = ?, phone = ?, notes = ?
             WHERE id = ?",
            params![
                first_name,
                last_name,
                date_of_birth,
                email,
                phone,
                notes,
                player_id
            ],
        )?;
        debug!(player_id = %player_id, "Updated player");
        self.get_player(player_id)
    }

    /// Delete a player and everything hanging off them.
    ///
    /// Refused while any payment is recorded against the player's fees.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<()> {
        let payments: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM payments p
             JOIN team_fees f ON f.id = p.team_fee_id
             JOIN player_terms pt ON pt.id = f.player_term_id
             WHERE pt.player_id = ?",
            [player_id],
            |row| row.get(0),
        )?;
        if payments > 0 {
            return Err(ClubError::Conflict {
                message: format!(
                    "Player {} has {} recorded payment(s) and cannot be removed",
                    player_id, payments
                ),
            });
        }

        let deleted = self
            .conn
            .execute("DELETE FROM players WHERE id = ?", [player_id])?;
        if deleted == 0 {
            return Err(ClubError::NotFound {
                entity: "Player",
                id: player_id.as_i64(),
            });
        }
        info!(player_id = %player_id, "Removed player");
        Ok(())
    }

    /// Attach a photo after checking its type and size.
    pub fn set_player_photo(&mut self, player_id: PlayerId, path: &Path) -> Result<Player> {
        require_player(&self.conn, player_id)?;
        let size = check_upload(path)?;
        let stored = std::fs::canonicalize(path)?;

        self.conn.execute(
            "UPDATE players SET photo_path = ? WHERE id = ?",
            params![stored.to_string_lossy().into_owned(), player_id],
        )?;
        debug!(player_id = %player_id, bytes = size, "Stored player photo path");
        self.get_player(player_id)
    }

    /// Create a guardian and link them to a player in one step.
    pub fn add_guardian(
        &mut self,
        player_id: PlayerId,
        new: &NewGuardian,
        relationship: Option<&str>,
        primary: bool,
    ) -> Result<Guardian> {
        let full_name = validate_name("guardian name", &new.full_name)?;
        let (email, phone) = contact_fields(new.email.as_deref(), new.phone.as_deref())?;

        let tx = self.conn.transaction()?;
        require_player(&tx, player_id)?;
        tx.execute(
            "INSERT INTO guardians (full_name, email, phone) VALUES (?, ?, ?)",
            params![full_name, email, phone],
        )?;
        let guardian_id = GuardianId::new(tx.last_insert_rowid());
        link_guardian_on(&tx, player_id, guardian_id, relationship, primary)?;
        tx.commit()?;

        info!(player_id = %player_id, guardian_id = %guardian_id, "Added guardian");
        Ok(Guardian {
            id: guardian_id,
            full_name,
            email,
            phone,
        })
    }

    /// Link an existing guardian to a player; re-linking updates the link.
    pub fn link_guardian(
        &mut self,
        player_id: PlayerId,
        guardian_id: GuardianId,
        relationship: Option<&str>,
        primary: bool,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        require_player(&tx, player_id)?;
        require_guardian(&tx, guardian_id)?;
        link_guardian_on(&tx, player_id, guardian_id, relationship, primary)?;
        tx.commit()?;
        Ok(())
    }

    /// Guardians of a player, primary contact first.
    pub fn guardians_for_player(&self, player_id: PlayerId) -> Result<Vec<PlayerGuardian>> {
        require_player(&self.conn, player_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT g.id, g.full_name, g.email, g.phone, pg.relationship, pg.is_primary
             FROM player_guardians pg
             JOIN guardians g ON g.id = pg.guardian_id
             WHERE pg.player_id = ?
             ORDER BY pg.is_primary DESC, g.full_name COLLATE NOCASE",
        )?;

        let rows = stmt.query_map([player_id], |row| {
            Ok(PlayerGuardian {
                guardian: Guardian {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                },
                relationship: row.get(4)?,
                is_primary: row.get(5)?,
            })
        })?;

        let mut guardians = Vec::new();
        for row in rows {
            guardians.push(row?);
        }
        Ok(guardians)
    }
}

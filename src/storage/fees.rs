//! Team fees, payments and balances

use super::{
    models::*,
    schema::ClubDatabase,
    seasons::{find_player_term_on, require_term},
};
use crate::{
    cli::types::{Money, PaymentId, PlayerId, TeamFeeId, TeamId, TermId},
    error::{ClubError, Result},
    validation::normalize_optional,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Amount due and amount paid so far for one fee row.
fn fee_position(conn: &Connection, team_fee_id: TeamFeeId) -> Result<(Money, Money)> {
    conn.query_row(
        "SELECT f.amount_due_cents,
                COALESCE((SELECT SUM(amount_cents) FROM payments WHERE team_fee_id = f.id), 0)
         FROM team_fees f WHERE f.id = ?",
        [team_fee_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?
    .ok_or(ClubError::NotFound {
        entity: "Fee",
        id: team_fee_id.as_i64(),
    })
}

impl ClubDatabase {
    /// Change a team's fee for a term.
    ///
    /// Fee rows still at the previous standard amount move to the new one;
    /// individually adjusted rows are left alone. Returns the updated
    /// team-term and how many fee rows were re-priced.
    ///
    /// Fails with a conflict when a row that would be re-priced already has
    /// more paid than the new fee.
    pub fn set_team_fee(
        &mut self,
        team_id: TeamId,
        term_id: TermId,
        fee: Money,
        due_on: Option<NaiveDate>,
    ) -> Result<(TeamTerm, usize)> {
        let previous = self.get_team_term(team_id, term_id)?;

        let tx = self.conn.transaction()?;
        let overpaid: i64 = tx.query_row(
            "SELECT COUNT(*) FROM team_fees f
             WHERE f.team_term_id = ?1 AND f.amount_due_cents = ?2
               AND COALESCE((SELECT SUM(amount_cents) FROM payments WHERE team_fee_id = f.id), 0) > ?3",
            params![previous.id, previous.fee, fee],
            |row| row.get(0),
        )?;
        if overpaid > 0 {
            return Err(ClubError::Conflict {
                message: format!(
                    "{} player(s) on {} have already paid more than {}; the fee cannot be lowered to it",
                    overpaid, previous.team_name, fee
                ),
            });
        }

        tx.execute(
            "UPDATE team_terms SET fee_cents = ?, fee_due_on = COALESCE(?, fee_due_on) WHERE id = ?",
            params![fee, due_on, previous.id],
        )?;
        let repriced = tx.execute(
            "UPDATE team_fees SET amount_due_cents = ?
             WHERE team_term_id = ? AND amount_due_cents = ?",
            params![fee, previous.id, previous.fee],
        )?;
        tx.commit()?;

        info!(
            team_term_id = %previous.id,
            old_fee = %previous.fee,
            new_fee = %fee,
            repriced,
            "Updated team fee"
        );
        Ok((self.get_team_term(team_id, term_id)?, repriced))
    }

    /// Set what one player owes, e.g. for a sibling discount.
    ///
    /// The new amount may not drop below what has already been paid.
    pub fn adjust_fee(&mut self, team_fee_id: TeamFeeId, amount_due: Money) -> Result<TeamFee> {
        let (_, paid) = fee_position(&self.conn, team_fee_id)?;
        if amount_due < paid {
            return Err(ClubError::Conflict {
                message: format!(
                    "Fee {} already has {} paid; it cannot be lowered to {}",
                    team_fee_id, paid, amount_due
                ),
            });
        }

        self.conn.execute(
            "UPDATE team_fees SET amount_due_cents = ? WHERE id = ?",
            params![amount_due, team_fee_id],
        )?;
        self.get_team_fee(team_fee_id)
    }

    pub fn get_team_fee(&self, team_fee_id: TeamFeeId) -> Result<TeamFee> {
        self.conn
            .query_row(
                "SELECT id, player_term_id, team_term_id, amount_due_cents
                 FROM team_fees WHERE id = ?",
                [team_fee_id],
                |row| {
                    Ok(TeamFee {
                        id: row.get(0)?,
                        player_term_id: row.get(1)?,
                        team_term_id: row.get(2)?,
                        amount_due: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or(ClubError::NotFound {
                entity: "Fee",
                id: team_fee_id.as_i64(),
            })
    }

    /// The fee row for a player on a team in a term.
    pub fn find_team_fee(
        &self,
        player_id: PlayerId,
        team_id: TeamId,
        term_id: TermId,
    ) -> Result<Option<TeamFee>> {
        let team_term = self.get_team_term(team_id, term_id)?;
        let player_term = match find_player_term_on(&self.conn, player_id, term_id)? {
            Some(player_term) => player_term,
            None => return Ok(None),
        };

        let fee = self
            .conn
            .query_row(
                "SELECT id FROM team_fees WHERE player_term_id = ? AND team_term_id = ?",
                params![player_term.id, team_term.id],
                |row| row.get::<_, TeamFeeId>(0),
            )
            .optional()?;
        fee.map(|id| self.get_team_fee(id)).transpose()
    }

    /// Record a payment against a fee row.
    ///
    /// The amount must be positive and no larger than what is still owed.
    pub fn record_payment(&mut self, payment: &NewPayment) -> Result<Payment> {
        if !payment.amount.is_positive() {
            return Err(ClubError::InvalidAmount {
                value: payment.amount.to_string(),
            });
        }

        let tx = self.conn.transaction()?;
        let (due, paid) = fee_position(&tx, payment.team_fee_id)?;
        let outstanding = due - paid;
        if payment.amount > outstanding {
            warn!(
                team_fee_id = %payment.team_fee_id,
                amount = %payment.amount,
                outstanding = %outstanding,
                "Rejected overpayment"
            );
            return Err(ClubError::Overpayment {
                amount: payment.amount.to_string(),
                outstanding: outstanding.to_string(),
            });
        }

        let reference = normalize_optional(payment.reference.as_deref());
        tx.execute(
            "INSERT INTO payments (team_fee_id, amount_cents, paid_on, method, reference)
             VALUES (?, ?, ?, ?, ?)",
            params![
                payment.team_fee_id,
                payment.amount,
                payment.paid_on,
                payment.method,
                reference
            ],
        )?;
        let id = PaymentId::new(tx.last_insert_rowid());
        tx.commit()?;

        info!(
            payment_id = %id,
            team_fee_id = %payment.team_fee_id,
            amount = %payment.amount,
            "Recorded payment"
        );
        Ok(Payment {
            id,
            team_fee_id: payment.team_fee_id,
            amount: payment.amount,
            paid_on: payment.paid_on,
            method: payment.method,
            reference,
        })
    }

    /// Payments against one fee row, oldest first.
    pub fn payments_for_fee(&self, team_fee_id: TeamFeeId) -> Result<Vec<Payment>> {
        self.get_team_fee(team_fee_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, team_fee_id, amount_cents, paid_on, method, reference
             FROM payments WHERE team_fee_id = ? ORDER BY paid_on, id",
        )?;
        let rows = stmt.query_map([team_fee_id], |row| {
            Ok(Payment {
                id: row.get(0)?,
                team_fee_id: row.get(1)?,
                amount: row.get(2)?,
                paid_on: row.get(3)?,
                method: row.get(4)?,
                reference: row.get(5)?,
            })
        })?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row?);
        }
        Ok(payments)
    }

    /// Balances for every fee row in a term, by team then player.
    ///
    /// A row is overdue when its due date is before `today` and money is
    /// still owed.
    pub fn fee_balances(
        &self,
        term_id: TermId,
        team_id: Option<TeamId>,
        only_outstanding: bool,
        today: NaiveDate,
    ) -> Result<Vec<FeeBalance>> {
        require_term(&self.conn, term_id)?;
        let mut stmt = self.conn.prepare(
            "SELECT f.id, p.id, p.first_name || ' ' || p.last_name, t.name, f.amount_due_cents,
                    COALESCE((SELECT SUM(amount_cents) FROM payments WHERE team_fee_id = f.id), 0),
                    tt.fee_due_on
             FROM team_fees f
             JOIN team_terms tt ON tt.id = f.team_term_id
             JOIN teams t ON t.id = tt.team_id
             JOIN player_terms pt ON pt.id = f.player_term_id
             JOIN players p ON p.id = pt.player_id
             WHERE tt.term_id = ?1 AND (?2 IS NULL OR tt.team_id = ?2)
             ORDER BY t.name COLLATE NOCASE, p.last_name COLLATE NOCASE,
                      p.first_name COLLATE NOCASE",
        )?;

        let rows = stmt.query_map(params![term_id, team_id], |row| {
            let amount_due: Money = row.get(4)?;
            let amount_paid: Money = row.get(5)?;
            let due_on: Option<NaiveDate> = row.get(6)?;
            let outstanding = amount_due - amount_paid;
            Ok(FeeBalance {
                team_fee_id: row.get(0)?,
                player_id: row.get(1)?,
                player_name: row.get(2)?,
                team_name: row.get(3)?,
                amount_due,
                amount_paid,
                outstanding,
                due_on,
                overdue: outstanding.is_positive() && due_on.is_some_and(|d| d < today),
            })
        })?;

        let mut balances = Vec::new();
        for row in rows {
            let balance = row?;
            if !only_outstanding || balance.outstanding.is_positive() {
                balances.push(balance);
            }
        }
        Ok(balances)
    }

    /// Term-wide sums of what is due, paid and still owed.
    pub fn fee_totals(&self, term_id: TermId) -> Result<FeeTotals> {
        let balances = self.fee_balances(term_id, None, false, NaiveDate::MIN)?;

        let owing: BTreeSet<PlayerId> = balances
            .iter()
            .filter(|b| b.outstanding.is_positive())
            .map(|b| b.player_id)
            .collect();

        Ok(FeeTotals {
            amount_due: balances.iter().map(|b| b.amount_due).sum(),
            amount_paid: balances.iter().map(|b| b.amount_paid).sum(),
            outstanding: balances.iter().map(|b| b.outstanding).sum(),
            players_owing: owing.len(),
        })
    }
}

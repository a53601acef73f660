//! Fee and payment commands

use super::common::{or_dash, CommandContext};
use crate::{
    cli::{types::time::today, FeeCmd},
    storage::{FeeBalance, FeeTotals, NewPayment, Payment, TeamTerm},
    ClubError, PlayerId, Result, TeamFeeId, TeamId, TermId,
};
use serde::Serialize;

fn print_balances(balances: &[FeeBalance]) {
    if balances.is_empty() {
        println!("No fees recorded");
        return;
    }
    println!(
        "{:>5}  {:<24} {:<16} {:>9} {:>9} {:>9}  {}",
        "Fee", "Player", "Team", "Due", "Paid", "Owing", "Due on"
    );
    for b in balances {
        println!(
            "{:>5}  {:<24} {:<16} {:>9} {:>9} {:>9}  {}{}",
            b.team_fee_id,
            b.player_name,
            b.team_name,
            b.amount_due,
            b.amount_paid,
            b.outstanding,
            or_dash(b.due_on),
            if b.overdue { "  OVERDUE" } else { "" },
        );
    }
}

fn print_payments(payments: &[Payment]) {
    if payments.is_empty() {
        println!("No payments yet");
        return;
    }
    for p in payments {
        println!(
            "{:>5}  {}  {:>9}  {:<8} {}",
            p.id,
            p.paid_on,
            p.amount,
            p.method,
            p.reference.as_deref().unwrap_or(""),
        );
    }
}

#[derive(Debug, Serialize)]
struct FeeChange {
    team_term: TeamTerm,
    repriced: usize,
}

/// The fee row a payment is for: given directly, or looked up from the
/// player, team and term.
fn resolve_fee(
    ctx: &CommandContext,
    fee: Option<TeamFeeId>,
    player: Option<PlayerId>,
    team: Option<TeamId>,
    term: Option<TermId>,
) -> Result<TeamFeeId> {
    if let Some(fee) = fee {
        return Ok(fee);
    }
    match (player, team, term) {
        (Some(player), Some(team), Some(term)) => ctx
            .db
            .find_team_fee(player, team, term)?
            .map(|f| f.id)
            .ok_or_else(|| ClubError::validation(
                "fee",
                format!("player {} has no fee for team {} in term {}", player, team, term),
            )),
        _ => Err(ClubError::validation(
            "fee",
            "give --fee, or --player with --team and --term",
        )),
    }
}

/// Handle the `fee` command group
pub fn handle_fee(ctx: &mut CommandContext, cmd: FeeCmd) -> Result<()> {
    match cmd {
        FeeCmd::Set {
            team,
            term,
            amount,
            due,
        } => {
            let (team_term, repriced) = ctx.db.set_team_fee(team, term, amount, due)?;
            ctx.emit(&FeeChange { team_term, repriced }, |c| {
                println!(
                    "✓ {} fee for {} is now {} ({} fee rows updated)",
                    c.team_term.team_name, c.team_term.term_name, c.team_term.fee, c.repriced
                )
            })
        }

        FeeCmd::Adjust { fee, amount } => {
            let fee = ctx.db.adjust_fee(fee, amount)?;
            ctx.emit(&fee, |f| println!("✓ Fee {} now due: {}", f.id, f.amount_due))
        }

        FeeCmd::Pay {
            fee,
            player,
            team,
            term,
            amount,
            date,
            method,
            reference,
        } => {
            let team_fee_id = resolve_fee(ctx, fee, player, team, term)?;
            let payment = ctx.db.record_payment(&NewPayment {
                team_fee_id,
                amount,
                paid_on: date.unwrap_or_else(today),
                method,
                reference,
            })?;
            ctx.emit(&payment, |p| {
                println!(
                    "✓ Recorded {} {} payment against fee {} ({})",
                    p.amount, p.method, p.team_fee_id, p.id
                )
            })
        }

        FeeCmd::Balances {
            term,
            team,
            outstanding,
        } => {
            let balances = ctx.db.fee_balances(term, team, outstanding, today())?;
            ctx.emit(&balances, |b| print_balances(b))
        }

        FeeCmd::Totals { term } => {
            let totals = ctx.db.fee_totals(term)?;
            ctx.emit(&totals, |t: &FeeTotals| {
                println!("Due:           {:>10}", t.amount_due);
                println!("Paid:          {:>10}", t.amount_paid);
                println!("Outstanding:   {:>10}", t.outstanding);
                println!("Players owing: {:>10}", t.players_owing);
            })
        }

        FeeCmd::History { fee } => {
            let payments = ctx.db.payments_for_fee(fee)?;
            ctx.emit(&payments, |p| print_payments(p))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::ClubDatabase, Money, Role};
    use chrono::NaiveDate;

    fn ctx_with_fee() -> (CommandContext, PlayerId, TeamId, TermId) {
        let mut db = ClubDatabase::new_in_memory().unwrap();
        let team = db.add_team("Under 12s", None).unwrap();
        let term = db
            .add_term(
                "Term 1",
                NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 11).unwrap(),
            )
            .unwrap();
        db.enrol_team(team.id, term.id, Some(Money::from_cents(9000)), None)
            .unwrap();
        let player = db
            .add_player(&crate::storage::NewPlayer {
                first_name: "Ana".into(),
                last_name: "Silva".into(),
                ..Default::default()
            })
            .unwrap();
        db.assign_players(team.id, term.id, &[player.id], Role::Player)
            .unwrap();
        (CommandContext { db, json: false }, player.id, team.id, term.id)
    }

    #[test]
    fn test_resolve_fee_by_id_wins() {
        let (ctx, _, _, _) = ctx_with_fee();
        let id = resolve_fee(&ctx, Some(TeamFeeId::new(77)), None, None, None).unwrap();
        assert_eq!(id, TeamFeeId::new(77));
    }

    #[test]
    fn test_resolve_fee_by_player_team_term() {
        let (ctx, player, team, term) = ctx_with_fee();
        let id = resolve_fee(&ctx, None, Some(player), Some(team), Some(term)).unwrap();
        assert_eq!(ctx.db.get_team_fee(id).unwrap().amount_due, Money::from_cents(9000));
    }

    #[test]
    fn test_resolve_fee_needs_enough_to_go_on() {
        let (ctx, player, _, _) = ctx_with_fee();
        let result = resolve_fee(&ctx, None, Some(player), None, None);
        assert!(matches!(result, Err(ClubError::Validation { .. })));
    }

    #[test]
    fn test_pay_command_records_payment() {
        let (mut ctx, player, team, term) = ctx_with_fee();
        handle_fee(
            &mut ctx,
            FeeCmd::Pay {
                fee: None,
                player: Some(player),
                team: Some(team),
                term: Some(term),
                amount: Money::from_cents(4000),
                date: None,
                method: crate::PaymentMethod::Cash,
                reference: Some("receipt 12".into()),
            },
        )
        .unwrap();

        let totals = ctx.db.fee_totals(term).unwrap();
        assert_eq!(totals.amount_paid, Money::from_cents(4000));
        assert_eq!(totals.outstanding, Money::from_cents(5000));
    }
}

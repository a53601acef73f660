//! Command handler tests driven through parsed command lines

use super::*;
use crate::{
    cli::Club,
    storage::ClubDatabase,
    AttendanceStatus, ClubError, Money, PlayerId, TeamId, TermId,
};
use clap::Parser;

fn ctx() -> CommandContext {
    CommandContext {
        db: ClubDatabase::new_in_memory().unwrap(),
        json: false,
    }
}

async fn run_line(ctx: &mut CommandContext, line: &[&str]) -> Result<()> {
    let mut args = vec!["clubhouse"];
    args.extend_from_slice(line);
    let club = Club::try_parse_from(args).unwrap();
    dispatch(ctx, club.command).await
}

/// A term, a team enrolled at 120.00 and three players.
async fn seeded() -> CommandContext {
    let mut ctx = ctx();
    for line in [
        &["term", "add", "Term 1 2025", "--starts", "2025-01-27", "--ends", "2025-04-11"][..],
        &["team", "add", "Under 12s", "--age-group", "U12"],
        &["team", "enrol", "--team", "1", "--term", "1", "--fee", "120", "--due", "2025-02-28"],
        &["player", "add", "Ana", "Silva", "--dob", "2014-05-02"],
        &["player", "add", "Ben", "Okoro", "--email", "ben.parent@example.com"],
        &["player", "add", "Cai", "Wong"],
    ] {
        run_line(&mut ctx, line).await.unwrap();
    }
    ctx
}

#[tokio::test]
async fn test_assign_twice_is_idempotent() {
    let mut ctx = seeded().await;
    let line = ["team", "assign", "--team", "1", "--term", "1", "-p", "1,2,3"];

    run_line(&mut ctx, &line).await.unwrap();
    run_line(&mut ctx, &line).await.unwrap();

    let roster = ctx.db.team_roster(TeamId::new(1), TermId::new(1)).unwrap();
    assert_eq!(roster.len(), 3);
    let balances = ctx
        .db
        .fee_balances(TermId::new(1), None, false, chrono::NaiveDate::MIN)
        .unwrap();
    assert_eq!(balances.len(), 3);
    assert!(balances.iter().all(|b| b.amount_due == Money::from_cents(12000)));
}

#[tokio::test]
async fn test_training_roll_workflow() {
    let mut ctx = seeded().await;
    run_line(&mut ctx, &["team", "assign", "--team", "1", "--term", "1", "-p", "1,2,3"])
        .await
        .unwrap();
    run_line(
        &mut ctx,
        &[
            "event", "add", "training", "Tuesday training", "--start", "2025-02-04 17:00",
            "--end", "2025-02-04 18:00", "--team", "1",
        ],
    )
    .await
    .unwrap();

    run_line(&mut ctx, &["roll", "take", "1", "1=late", "2=absent"])
        .await
        .unwrap();
    run_line(&mut ctx, &["roll", "fill", "1"]).await.unwrap();

    let sheet = ctx.db.roll_sheet(crate::EventId::new(1)).unwrap();
    let status_of = |id: i64| {
        sheet
            .iter()
            .find(|e| e.player_id == PlayerId::new(id))
            .and_then(|e| e.status)
    };
    assert_eq!(status_of(1), Some(AttendanceStatus::Late));
    assert_eq!(status_of(2), Some(AttendanceStatus::Absent));
    assert_eq!(status_of(3), Some(AttendanceStatus::Present));
}

#[tokio::test]
async fn test_roll_take_rejects_player_off_sheet() {
    let mut ctx = seeded().await;
    run_line(&mut ctx, &["team", "assign", "--team", "1", "--term", "1", "-p", "1"])
        .await
        .unwrap();
    run_line(
        &mut ctx,
        &[
            "event", "add", "game", "Round 1", "--start", "2025-02-08 09:00", "--end",
            "2025-02-08 10:00", "--team", "1",
        ],
    )
    .await
    .unwrap();

    let result = run_line(&mut ctx, &["roll", "take", "1", "1=present", "3=present"]).await;
    assert!(matches!(result, Err(ClubError::NotOnRoll { player_id: 3, .. })));

    // The whole roll is rejected, including the valid mark.
    let sheet = ctx.db.roll_sheet(crate::EventId::new(1)).unwrap();
    assert!(sheet.iter().all(|e| e.status.is_none()));
}

#[tokio::test]
async fn test_event_outside_any_term_fails() {
    let mut ctx = seeded().await;
    let result = run_line(
        &mut ctx,
        &[
            "event", "add", "tournament", "Winter cup", "--start", "2025-07-12 08:00", "--end",
            "2025-07-12 16:00",
        ],
    )
    .await;
    assert!(matches!(result, Err(ClubError::NoTermForDate { .. })));
}

#[tokio::test]
async fn test_fee_payment_and_overpayment() {
    let mut ctx = seeded().await;
    run_line(&mut ctx, &["team", "assign", "--team", "1", "--term", "1", "-p", "1"])
        .await
        .unwrap();
    run_line(
        &mut ctx,
        &[
            "fee", "pay", "--player", "1", "--team", "1", "--term", "1", "--amount", "100",
            "--date", "2025-02-10", "--method", "card",
        ],
    )
    .await
    .unwrap();

    let result = run_line(&mut ctx, &["fee", "pay", "--fee", "1", "--amount", "20.01"]).await;
    match result {
        Err(ClubError::Overpayment {
            amount,
            outstanding,
        }) => {
            assert_eq!(amount, "20.01");
            assert_eq!(outstanding, "20.00");
        }
        other => panic!("Expected Overpayment, got {:?}", other),
    }

    run_line(&mut ctx, &["fee", "pay", "--fee", "1", "--amount", "20"])
        .await
        .unwrap();
    let totals = ctx.db.fee_totals(TermId::new(1)).unwrap();
    assert_eq!(totals.outstanding, Money::ZERO);
    assert_eq!(totals.players_owing, 0);
}

#[tokio::test]
async fn test_listing_commands_print_in_both_modes() {
    let mut ctx = seeded().await;
    run_line(&mut ctx, &["team", "assign", "--team", "1", "--term", "1", "-p", "1,2"])
        .await
        .unwrap();

    for json in [false, true] {
        ctx.json = json;
        for line in [
            &["player", "list"][..],
            &["player", "list", "--search", "oko"],
            &["player", "show", "1"],
            &["team", "list"],
            &["team", "roster", "--team", "1", "--term", "1"],
            &["term", "list"],
            &["term", "current", "--date", "2025-03-01"],
            &["term", "teams", "1"],
            &["register", "list", "--term", "1"],
            &["event", "list"],
            &["roll", "summary", "--term", "1"],
            &["fee", "balances", "--term", "1", "--outstanding"],
            &["fee", "totals", "--term", "1"],
            &["fee", "history", "1"],
            &["sync", "push", "--dry-run"],
        ] {
            run_line(&mut ctx, line).await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_term_current_without_match() {
    let mut ctx = seeded().await;
    let result = run_line(&mut ctx, &["term", "current", "--date", "2026-01-01"]).await;
    assert!(matches!(result, Err(ClubError::NoTermForDate { .. })));
}

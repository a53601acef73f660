//! Integration tests for command handlers

use clap::Parser;
use clubhouse::{
    cli::{Club, Commands, PlayerCmd, TeamCmd},
    commands::{common::CommandContext, dispatch},
    ClubError, Money, PlayerId, Role, TeamId, TermId,
};
use std::path::PathBuf;

fn parse(line: &[&str]) -> Club {
    let mut args = vec!["clubhouse"];
    args.extend_from_slice(line);
    Club::try_parse_from(args).unwrap()
}

#[tokio::test]
async fn test_commands_against_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("club.db");
    let db_arg = db_path.to_str().unwrap();

    for line in [
        &["--db", db_arg, "term", "add", "Term 3", "--starts", "2025-07-21", "--ends", "2025-09-26"][..],
        &["--db", db_arg, "team", "add", "Under 9s"],
        &["--db", db_arg, "team", "enrol", "--team", "1", "--term", "1", "--fee", "$85.50"],
        &["--db", db_arg, "player", "add", "Mia", "Tane"],
        &["--db", db_arg, "player", "add", "Leo", "Park"],
        &["--db", db_arg, "team", "assign", "--team", "1", "--term", "1", "-p", "1", "-p", "2"],
    ] {
        let club = parse(line);
        assert_eq!(club.db, Some(PathBuf::from(db_arg)));
        clubhouse::commands::run(club).await.unwrap();
    }

    // Reopen and check what the commands wrote.
    let ctx = CommandContext::open(Some(db_path), false).unwrap();
    let roster = ctx.db.team_roster(TeamId::new(1), TermId::new(1)).unwrap();
    assert_eq!(roster.len(), 2);
    let totals = ctx.db.fee_totals(TermId::new(1)).unwrap();
    assert_eq!(totals.amount_due, Money::from_cents(17100));
}

#[tokio::test]
async fn test_handler_errors_surface_as_club_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = CommandContext::open(Some(dir.path().join("club.db")), false).unwrap();

    let result = dispatch(
        &mut ctx,
        Commands::Player {
            cmd: PlayerCmd::Add {
                first_name: " ".to_string(),
                last_name: "Tane".to_string(),
                dob: None,
                email: None,
                phone: None,
                notes: None,
            },
        },
    )
    .await;
    let err = result.unwrap_err();
    assert!(matches!(err, ClubError::Validation { .. }));
    assert_eq!(err.to_string(), "Invalid first name: must not be blank");

    let result = dispatch(
        &mut ctx,
        Commands::Team {
            cmd: TeamCmd::Assign {
                team: TeamId::new(1),
                term: TermId::new(1),
                players: vec![PlayerId::new(1)],
                role: Role::Player,
            },
        },
    )
    .await;
    assert_eq!(result.unwrap_err().to_string(), "Player 1 not found");
}

#[test]
fn test_invalid_ids_rejected_at_parse_time() {
    let result = Club::try_parse_from(["clubhouse", "player", "show", "abc"]);
    assert!(result.is_err());

    let result = Club::try_parse_from(["clubhouse", "roll", "mark", "1", "--player", "2", "--status", "sick"]);
    assert!(result.is_err());
}

#[test]
fn test_dates_parsed_strictly() {
    let result = Club::try_parse_from([
        "clubhouse", "term", "add", "T1", "--starts", "27/01/2025", "--ends", "2025-04-11",
    ]);
    assert!(result.is_err());
}

//! CLI argument definitions and parsing.

pub mod types;

use crate::error::{ClubError, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, str::FromStr};
use types::{
    parse_date, parse_datetime, AttendanceStatus, EventId, EventKind, GuardianId, Money,
    PaymentMethod, PlayerId, PlayerTermId, RegistrationStatus, Role, TeamFeeId, TeamId, TermId,
};

#[derive(Debug, Parser)]
#[clap(name = "clubhouse", about = "Sports club administration", version)]
pub struct Club {
    /// Database file (or set `CLUBHOUSE_DB_PATH` env var).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output results as JSON instead of tables.
    #[clap(long, global = true)]
    pub json: bool,

    /// Log debug detail to stderr.
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Players: add, list, show, update, remove, photo
    Player {
        #[clap(subcommand)]
        cmd: PlayerCmd,
    },
    /// Guardians and their links to players
    Guardian {
        #[clap(subcommand)]
        cmd: GuardianCmd,
    },
    /// Teams, term enrolment and team assignment
    Team {
        #[clap(subcommand)]
        cmd: TeamCmd,
    },
    /// Terms
    Term {
        #[clap(subcommand)]
        cmd: TermCmd,
    },
    /// Player registrations for a term
    Register {
        #[clap(subcommand)]
        cmd: RegisterCmd,
    },
    /// Trainings, games and tournaments
    Event {
        #[clap(subcommand)]
        cmd: EventCmd,
    },
    /// Take and review attendance
    Roll {
        #[clap(subcommand)]
        cmd: RollCmd,
    },
    /// Team fees, payments and balances
    Fee {
        #[clap(subcommand)]
        cmd: FeeCmd,
    },
    /// Push the local database to the hosted backend
    Sync {
        #[clap(subcommand)]
        cmd: SyncCmd,
    },
}

#[derive(Debug, Subcommand)]
pub enum PlayerCmd {
    /// Add a player.
    Add {
        first_name: String,
        last_name: String,

        /// Date of birth (YYYY-MM-DD).
        #[clap(long, value_parser = parse_date)]
        dob: Option<chrono::NaiveDate>,

        #[clap(long)]
        email: Option<String>,

        #[clap(long)]
        phone: Option<String>,

        #[clap(long)]
        notes: Option<String>,
    },

    /// List players, optionally searching first and last names.
    List {
        #[clap(long, short)]
        search: Option<String>,
    },

    /// Show a player with guardians and registrations.
    Show { id: PlayerId },

    /// Change some of a player's details. Pass "" to clear email, phone or notes.
    Update {
        id: PlayerId,

        #[clap(long)]
        first_name: Option<String>,

        #[clap(long)]
        last_name: Option<String>,

        #[clap(long, value_parser = parse_date)]
        dob: Option<chrono::NaiveDate>,

        #[clap(long)]
        email: Option<String>,

        #[clap(long)]
        phone: Option<String>,

        #[clap(long)]
        notes: Option<String>,
    },

    /// Remove a player and everything recorded for them.
    Remove { id: PlayerId },

    /// Attach a photo (jpg, png or webp, up to 5 MiB).
    Photo { id: PlayerId, path: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum GuardianCmd {
    /// Create a guardian and link them to a player.
    Add {
        #[clap(long)]
        player: PlayerId,

        full_name: String,

        #[clap(long)]
        email: Option<String>,

        #[clap(long)]
        phone: Option<String>,

        /// e.g. mother, father, carer
        #[clap(long)]
        relationship: Option<String>,

        /// Make this the player's primary contact.
        #[clap(long)]
        primary: bool,
    },

    /// Link an existing guardian to another player.
    Link {
        #[clap(long)]
        player: PlayerId,

        #[clap(long)]
        guardian: GuardianId,

        #[clap(long)]
        relationship: Option<String>,

        #[clap(long)]
        primary: bool,
    },

    /// Guardians of a player, primary first.
    List {
        #[clap(long)]
        player: PlayerId,
    },
}

#[derive(Debug, Subcommand)]
pub enum TeamCmd {
    /// Add a team.
    Add {
        name: String,

        #[clap(long)]
        age_group: Option<String>,
    },

    /// List teams.
    List,

    /// Enrol a team in a term, setting its fee.
    Enrol {
        #[clap(long)]
        team: TeamId,

        #[clap(long)]
        term: TermId,

        /// Fee per player, e.g. 120 or 120.50.
        #[clap(long)]
        fee: Option<Money>,

        /// Fee due date (YYYY-MM-DD).
        #[clap(long, value_parser = parse_date)]
        due: Option<chrono::NaiveDate>,
    },

    /// Assign players to a team for a term.
    Assign {
        #[clap(long)]
        team: TeamId,

        #[clap(long)]
        term: TermId,

        /// Player ids, repeatable or comma separated: `-p 1,2 -p 7`.
        #[clap(long = "player", short = 'p', required = true, value_delimiter = ',')]
        players: Vec<PlayerId>,

        #[clap(long, default_value_t = Role::Player)]
        role: Role,
    },

    /// Take a player off a team for a term.
    Unassign {
        #[clap(long)]
        team: TeamId,

        #[clap(long)]
        term: TermId,

        #[clap(long)]
        player: PlayerId,
    },

    /// Members of a team for a term.
    Roster {
        #[clap(long)]
        team: TeamId,

        #[clap(long)]
        term: TermId,
    },
}

#[derive(Debug, Subcommand)]
pub enum TermCmd {
    /// Add a term.
    Add {
        name: String,

        #[clap(long, value_parser = parse_date)]
        starts: chrono::NaiveDate,

        #[clap(long, value_parser = parse_date)]
        ends: chrono::NaiveDate,
    },

    /// List terms, most recent first.
    List,

    /// The term containing a date (today by default).
    Current {
        #[clap(long, value_parser = parse_date)]
        date: Option<chrono::NaiveDate>,
    },

    /// Teams enrolled in a term with their fees.
    Teams { term: TermId },
}

#[derive(Debug, Subcommand)]
pub enum RegisterCmd {
    /// Register a player for a term.
    Add {
        #[clap(long)]
        player: PlayerId,

        #[clap(long)]
        term: TermId,

        #[clap(long)]
        status: Option<RegistrationStatus>,
    },

    /// Registrations for a term.
    List {
        #[clap(long)]
        term: TermId,

        #[clap(long)]
        status: Option<RegistrationStatus>,
    },

    /// Change the status of a registration.
    SetStatus {
        registration: PlayerTermId,
        status: RegistrationStatus,
    },
}

#[derive(Debug, Subcommand)]
pub enum EventCmd {
    /// Schedule an event.
    Add {
        kind: EventKind,

        title: String,

        /// Start time, e.g. `2025-03-14 17:30`.
        #[clap(long, value_parser = parse_datetime)]
        start: chrono::NaiveDateTime,

        #[clap(long, value_parser = parse_datetime)]
        end: chrono::NaiveDateTime,

        /// Term; defaults to the term containing the start date.
        #[clap(long)]
        term: Option<TermId>,

        /// Team; omit for a club-wide event.
        #[clap(long)]
        team: Option<TeamId>,

        #[clap(long)]
        location: Option<String>,

        #[clap(long)]
        notes: Option<String>,
    },

    /// List events in start order.
    List {
        #[clap(long)]
        term: Option<TermId>,

        #[clap(long)]
        team: Option<TeamId>,

        #[clap(long, value_parser = parse_date)]
        from: Option<chrono::NaiveDate>,

        #[clap(long, value_parser = parse_date)]
        to: Option<chrono::NaiveDate>,
    },

    /// Move an event to a new time.
    Reschedule {
        id: EventId,

        #[clap(long, value_parser = parse_datetime)]
        start: chrono::NaiveDateTime,

        #[clap(long, value_parser = parse_datetime)]
        end: chrono::NaiveDateTime,
    },

    /// Remove an event and its attendance.
    Remove { id: EventId },
}

#[derive(Debug, Subcommand)]
pub enum RollCmd {
    /// The roll sheet for an event.
    Show { event: EventId },

    /// Mark one player.
    Mark {
        event: EventId,

        #[clap(long)]
        player: PlayerId,

        #[clap(long)]
        status: AttendanceStatus,

        #[clap(long)]
        notes: Option<String>,
    },

    /// Record several marks at once: `clubhouse roll take 4 12=present 15=late`.
    Take {
        event: EventId,

        #[clap(required = true)]
        marks: Vec<MarkArg>,
    },

    /// Give everyone not yet marked the same status.
    Fill {
        event: EventId,

        #[clap(long, default_value_t = AttendanceStatus::Present)]
        status: AttendanceStatus,
    },

    /// Attendance counts per player over a term.
    Summary {
        #[clap(long)]
        term: TermId,

        #[clap(long)]
        team: Option<TeamId>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FeeCmd {
    /// Change a team's fee for a term.
    Set {
        #[clap(long)]
        team: TeamId,

        #[clap(long)]
        term: TermId,

        #[clap(long)]
        amount: Money,

        #[clap(long, value_parser = parse_date)]
        due: Option<chrono::NaiveDate>,
    },

    /// Change what one player owes.
    Adjust {
        fee: TeamFeeId,

        #[clap(long)]
        amount: Money,
    },

    /// Record a payment, by fee id or by player, team and term.
    Pay {
        #[clap(long, conflicts_with_all = ["player", "team", "term"])]
        fee: Option<TeamFeeId>,

        #[clap(long, requires_all = ["team", "term"])]
        player: Option<PlayerId>,

        #[clap(long)]
        team: Option<TeamId>,

        #[clap(long)]
        term: Option<TermId>,

        #[clap(long)]
        amount: Money,

        /// Payment date; defaults to today.
        #[clap(long, value_parser = parse_date)]
        date: Option<chrono::NaiveDate>,

        #[clap(long, default_value_t = PaymentMethod::Transfer)]
        method: PaymentMethod,

        #[clap(long)]
        reference: Option<String>,
    },

    /// Balances for a term.
    Balances {
        #[clap(long)]
        term: TermId,

        #[clap(long)]
        team: Option<TeamId>,

        /// Only rows with money still owed.
        #[clap(long)]
        outstanding: bool,
    },

    /// Term-wide totals.
    Totals {
        #[clap(long)]
        term: TermId,
    },

    /// Payments made against one fee.
    History { fee: TeamFeeId },
}

#[derive(Debug, Subcommand)]
pub enum SyncCmd {
    /// Upsert every table to the backend (`CLUBHOUSE_SERVICE_URL`, `CLUBHOUSE_SERVICE_KEY`).
    Push {
        /// Show row counts without sending anything.
        #[clap(long)]
        dry_run: bool,
    },
}

/// A `player=status` pair on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkArg {
    pub player_id: PlayerId,
    pub status: AttendanceStatus,
}

impl FromStr for MarkArg {
    type Err = ClubError;

    fn from_str(s: &str) -> Result<Self> {
        let (player, status) = s.split_once('=').ok_or_else(|| ClubError::InvalidValue {
            kind: "mark (expected player=status)",
            value: s.to_string(),
        })?;
        Ok(Self {
            player_id: player.parse()?,
            status: status.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Club::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let club = Club::try_parse_from([
            "clubhouse", "team", "list", "--json", "--db", "/tmp/x.db", "-v",
        ])
        .unwrap();
        assert!(club.json);
        assert!(club.verbose);
        assert_eq!(club.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(
            club.command,
            Commands::Team { cmd: TeamCmd::List }
        ));
    }

    #[test]
    fn test_assign_players_comma_and_repeat() {
        let club = Club::try_parse_from([
            "clubhouse", "team", "assign", "--team", "1", "--term", "2", "-p", "3,4", "-p", "5",
            "--role", "captain",
        ])
        .unwrap();
        match club.command {
            Commands::Team {
                cmd:
                    TeamCmd::Assign {
                        team,
                        term,
                        players,
                        role,
                    },
            } => {
                assert_eq!(team, TeamId::new(1));
                assert_eq!(term, TermId::new(2));
                assert_eq!(
                    players,
                    vec![PlayerId::new(3), PlayerId::new(4), PlayerId::new(5)]
                );
                assert_eq!(role, Role::Captain);
            }
            other => panic!("Expected team assign, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_money_rejected_by_parser() {
        let result = Club::try_parse_from([
            "clubhouse", "fee", "set", "--team", "1", "--term", "1", "--amount", "12.345",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_event_add_parses_times() {
        let club = Club::try_parse_from([
            "clubhouse",
            "event",
            "add",
            "training",
            "Skills",
            "--start",
            "2025-02-04 17:00",
            "--end",
            "2025-02-04T18:30",
        ])
        .unwrap();
        match club.command {
            Commands::Event {
                cmd: EventCmd::Add { kind, start, end, .. },
            } => {
                assert_eq!(kind, EventKind::Training);
                assert_eq!((end - start).num_minutes(), 90);
            }
            other => panic!("Expected event add, got {:?}", other),
        }
    }

    #[test]
    fn test_mark_arg() {
        let mark: MarkArg = "12=late".parse().unwrap();
        assert_eq!(mark.player_id, PlayerId::new(12));
        assert_eq!(mark.status, AttendanceStatus::Late);

        assert!("12".parse::<MarkArg>().is_err());
        assert!("x=present".parse::<MarkArg>().is_err());
        assert!("12=sick".parse::<MarkArg>().is_err());
    }

    #[test]
    fn test_pay_fee_conflicts_with_player() {
        let result = Club::try_parse_from([
            "clubhouse", "fee", "pay", "--fee", "1", "--player", "2", "--team", "3", "--term",
            "4", "--amount", "10",
        ]);
        assert!(result.is_err());
    }
}

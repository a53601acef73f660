//! Clubhouse: sports club administration library
//!
//! Keeps a club's records in a local SQLite database and can push them to a
//! hosted backend.
//!
//! ## Features
//!
//! - **Roster**: Players, guardians and contact details
//! - **Seasons**: Teams, terms, and each team's fee for a term
//! - **Team Assignment**: Bulk assignment of players to a team for a term
//! - **Roll**: Attendance for trainings, games and tournaments
//! - **Fees**: Payments, balances and overdue tracking
//! - **Sync**: Idempotent upsert of every table to the hosted backend
//!
//! ## Quick Start
//!
//! ```rust
//! use clubhouse::{storage::{ClubDatabase, NewPlayer}, Role};
//! use chrono::NaiveDate;
//!
//! # fn example() -> clubhouse::Result<()> {
//! let mut db = ClubDatabase::new_in_memory()?;
//! let team = db.add_team("Under 12s", Some("U12"))?;
//! let term = db.add_term(
//!     "Term 1 2025",
//!     NaiveDate::from_ymd_opt(2025, 1, 27).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 4, 11).unwrap(),
//! )?;
//! let player = db.add_player(&NewPlayer {
//!     first_name: "Ana".into(),
//!     last_name: "Silva".into(),
//!     ..NewPlayer::default()
//! })?;
//!
//! let outcome = db.assign_players(team.id, term.id, &[player.id], Role::Player)?;
//! assert_eq!(outcome.memberships_added, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export CLUBHOUSE_DB_PATH=~/club.db
//! export CLUBHOUSE_SERVICE_URL=https://club.example.co
//! export CLUBHOUSE_SERVICE_KEY=public-anon-key
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod storage;
pub mod sync;
pub mod validation;

// Re-export commonly used types
pub use cli::types::{
    AttendanceStatus, EventId, EventKind, GuardianId, MembershipId, Money, PaymentId,
    PaymentMethod, PlayerId, PlayerTermId, RegistrationStatus, Role, TeamFeeId, TeamId,
    TeamTermId, TermId,
};
pub use error::{ClubError, Result};
pub use storage::ClubDatabase;

pub const DB_PATH_ENV_VAR: &str = "CLUBHOUSE_DB_PATH";
pub const SERVICE_URL_ENV_VAR: &str = "CLUBHOUSE_SERVICE_URL";
pub const SERVICE_KEY_ENV_VAR: &str = "CLUBHOUSE_SERVICE_KEY";

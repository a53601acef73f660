//! Storage layer for the club database
//!
//! A thin layer over SQLite, one file per concern:
//! - `models`: Data structures
//! - `schema`: Connection and schema management
//! - `roster`: Players and guardians
//! - `seasons`: Teams, terms, team-terms and player registrations
//! - `assignment`: Bulk team assignment and rosters
//! - `events`: Event scheduling
//! - `roll`: Attendance
//! - `fees`: Fees, payments and balances
//! - `export`: Table export for sync

pub mod assignment;
pub mod events;
pub mod export;
pub mod fees;
pub mod models;
pub mod roll;
pub mod roster;
pub mod schema;
pub mod seasons;


pub use models::*;
pub use schema::{ClubDatabase, TABLES};

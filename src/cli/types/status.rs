//! Enumerated values stored as text columns: roles, statuses, kinds.

use crate::error::ClubError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire an enum with an `as_str` mapping into `Display`, `FromStr` and SQLite.
macro_rules! text_column {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ClubError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ClubError::InvalidValue {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: ClubError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

/// A member's role within a team for a term.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,
    Captain,
}

text_column!(Role, "role", {
    Player => "player",
    Captain => "captain",
});

/// Status recorded for one player at one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

text_column!(AttendanceStatus, "attendance status", {
    Present => "present",
    Absent => "absent",
    Late => "late",
});

impl AttendanceStatus {
    /// Whether the player turned up at all.
    pub fn attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

/// What kind of session an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Training,
    Game,
    Tournament,
}

text_column!(EventKind, "event kind", {
    Training => "training",
    Game => "game",
    Tournament => "tournament",
});

/// A player's registration state within a term.
///
/// Withdrawn registrations stay in the database (fees and attendance keep
/// pointing at them) but drop off club-wide roll sheets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Pending,
    Withdrawn,
}

text_column!(RegistrationStatus, "registration status", {
    Registered => "registered",
    Pending => "pending",
    Withdrawn => "withdrawn",
});

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    #[default]
    Transfer,
    Other,
}

text_column!(PaymentMethod, "payment method", {
    Cash => "cash",
    Card => "card",
    Transfer => "transfer",
    Other => "other",
});

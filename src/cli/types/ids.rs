//! Row id types for the club database.

use crate::error::{ClubError, Result};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declare a type-safe wrapper around a SQLite `INTEGER PRIMARY KEY`.
///
/// Keeps ids of different tables from being mixed up (a `PlayerId` cannot be
/// passed where a `PlayerTermId` is expected) while binding and reading like
/// a plain `i64`.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ClubError;

            fn from_str(s: &str) -> Result<Self> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

row_id!(
    /// Id of a row in `players`.
    ///
    /// ```rust
    /// use clubhouse::PlayerId;
    ///
    /// let id: PlayerId = "17".parse().unwrap();
    /// assert_eq!(id, PlayerId::new(17));
    /// assert_eq!(id.to_string(), "17");
    /// ```
    PlayerId
);
row_id!(
    /// Id of a row in `guardians`.
    GuardianId
);
row_id!(
    /// Id of a row in `teams`.
    TeamId
);
row_id!(
    /// Id of a row in `terms`.
    TermId
);
row_id!(
    /// Id of a team's participation in a term.
    TeamTermId
);
row_id!(
    /// Id of a player's registration in a term.
    PlayerTermId
);
row_id!(MembershipId);
row_id!(EventId);
row_id!(
    /// Id of the fee owed by one player for one team-term.
    TeamFeeId
);
row_id!(PaymentId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(" 12 ".parse::<TeamId>().unwrap(), TeamId::new(12));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        match "abc".parse::<EventId>() {
            Err(ClubError::InvalidId(_)) => (),
            other => panic!("Expected InvalidId, got {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&PlayerTermId::new(9)).unwrap();
        assert_eq!(json, "9");
    }

    #[test]
    fn test_sql_round_trip() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let id: TermId = conn
            .query_row("SELECT ?1", [TermId::new(2025)], |row| row.get(0))
            .unwrap();
        assert_eq!(id.as_i64(), 2025);
    }
}

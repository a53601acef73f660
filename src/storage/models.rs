//! Data models for the storage layer

use crate::cli::types::{
    AttendanceStatus, EventId, EventKind, GuardianId, MembershipId, Money, PaymentId,
    PaymentMethod, PlayerId, PlayerTermId, RegistrationStatus, Role, TeamFeeId, TeamId,
    TeamTermId, TermId,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Player information stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_path: Option<String>,
    pub notes: Option<String>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields supplied when adding a player. Validated before insert.
#[derive(Debug, Clone, Default)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct PlayerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: GuardianId,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewGuardian {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A guardian as seen from one player, with the link details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGuardian {
    pub guardian: Guardian,
    pub relationship: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub age_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub name: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl Term {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.starts_on <= date && date <= self.ends_on
    }
}

/// A team's participation in a term, carrying that term's fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTerm {
    pub id: TeamTermId,
    pub team_id: TeamId,
    pub term_id: TermId,
    pub team_name: String,
    pub term_name: String,
    pub fee: Money,
    pub fee_due_on: Option<NaiveDate>,
}

/// A player's registration in a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTerm {
    pub id: PlayerTermId,
    pub player_id: PlayerId,
    pub term_id: TermId,
    pub status: RegistrationStatus,
    pub registered_at: NaiveDateTime,
}

/// Registration row joined with player and term names for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub player_term_id: PlayerTermId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub term_id: TermId,
    pub term_name: String,
    pub status: RegistrationStatus,
}

/// One member of a team's roster for a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub membership_id: MembershipId,
    pub player_id: PlayerId,
    pub player_term_id: PlayerTermId,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: RegistrationStatus,
}

/// Result of a bulk team assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    pub team_term_id: Option<TeamTermId>,
    pub player_terms_created: usize,
    pub memberships_added: usize,
    pub roles_changed: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub term_id: TermId,
    pub team_term_id: Option<TeamTermId>,
    pub team_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub kind: EventKind,
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    /// Explicit term; when absent the term containing `starts_at` is used.
    pub term_id: Option<TermId>,
    pub team_id: Option<TeamId>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Filter for event listings; every field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub term_id: Option<TermId>,
    pub team_id: Option<TeamId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// One line of a roll sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollEntry {
    pub player_id: PlayerId,
    pub player_term_id: PlayerTermId,
    pub first_name: String,
    pub last_name: String,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

/// A single mark on a roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollMark {
    pub player_id: PlayerId,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Attendance totals for one player over a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub player_id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    /// Share of recorded events attended; `None` before any record.
    pub attendance_rate: Option<f64>,
}

impl AttendanceSummary {
    pub fn new(
        player_id: PlayerId,
        first_name: String,
        last_name: String,
        present: u32,
        late: u32,
        absent: u32,
    ) -> Self {
        let counts = [
            (AttendanceStatus::Present, present),
            (AttendanceStatus::Late, late),
            (AttendanceStatus::Absent, absent),
        ];
        let recorded: u32 = counts.iter().map(|(_, n)| n).sum();
        let attended: u32 = counts
            .iter()
            .filter(|(status, _)| status.attended())
            .map(|(_, n)| n)
            .sum();
        let attendance_rate = match recorded {
            0 => None,
            n => Some(f64::from(attended) / f64::from(n)),
        };

        Self {
            player_id,
            first_name,
            last_name,
            present,
            late,
            absent,
            attendance_rate,
        }
    }

    pub fn recorded(&self) -> u32 {
        self.present + self.late + self.absent
    }
}

/// What one player owes for one team-term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFee {
    pub id: TeamFeeId,
    pub player_term_id: PlayerTermId,
    pub team_term_id: TeamTermId,
    pub amount_due: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub team_fee_id: TeamFeeId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub team_fee_id: TeamFeeId,
    pub amount: Money,
    pub paid_on: NaiveDate,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

/// Balance of one fee row, joined with names for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBalance {
    pub team_fee_id: TeamFeeId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_name: String,
    pub amount_due: Money,
    pub amount_paid: Money,
    pub outstanding: Money,
    pub due_on: Option<NaiveDate>,
    pub overdue: bool,
}

/// Term-wide fee totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotals {
    pub amount_due: Money,
    pub amount_paid: Money,
    pub outstanding: Money,
    pub players_owing: usize,
}

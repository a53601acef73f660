//! Type-safe wrappers and enums for club data.

pub mod ids;
pub mod money;
pub mod status;
pub mod time;

pub use ids::{
    EventId, GuardianId, MembershipId, PaymentId, PlayerId, PlayerTermId, TeamFeeId, TeamId,
    TeamTermId, TermId,
};
pub use money::Money;
pub use status::{AttendanceStatus, EventKind, PaymentMethod, RegistrationStatus, Role};
pub use time::{parse_date, parse_datetime};

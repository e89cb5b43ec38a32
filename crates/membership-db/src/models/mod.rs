//! Entity models for the legacy membership schema.
//!
//! Each model owns the SQL for its table(s) as associated async functions.
//! All queries are tenant-scoped by `"ApplicationId"` except join lookups
//! that are already scoped through a tenant-filtered row.

pub mod role;
pub mod user;
pub mod user_role;

pub use role::MembershipRole;
pub use user::{MembershipUser, NewUser};
pub use user_role::UserRole;

use chrono::{DateTime, TimeZone, Utc};

/// Sentinel timestamp meaning "never happened".
///
/// The legacy schema records absent lockout/window timestamps as
/// 1754-01-01T00:00:00Z rather than NULL; the adapter reproduces that
/// convention on every write.
#[must_use]
pub fn never_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1754, 1, 1, 0, 0, 0)
        .single()
        .expect("sentinel date is a valid timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_never_date_sentinel() {
        let d = never_date();
        assert_eq!(d.year(), 1754);
        assert_eq!(d.month(), 1);
        assert_eq!(d.day(), 1);
    }

    #[test]
    fn test_never_date_precedes_real_timestamps() {
        assert!(never_date() < Utc::now());
    }
}

//! Monthly period keys.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar month encoded as `YYYYMM` (e.g. `202608`).
///
/// Monthly aggregates and rank rows are keyed by this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period(pub i32);

impl Period {
    /// The period containing `at`.
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        #[allow(clippy::cast_possible_wrap)] // year() is already i32; month() <= 12
        Self(at.year() * 100 + at.month() as i32)
    }

    /// The current period.
    #[must_use]
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// The raw `YYYYMM` value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn encodes_year_month() {
        let at = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        assert_eq!(Period::from_datetime(at), Period(202_608));
    }

    #[test]
    fn december_and_january_are_adjacent_numerically_distinct() {
        let dec = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let jan = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Period::from_datetime(dec), Period(202_512));
        assert_eq!(Period::from_datetime(jan), Period(202_601));
    }
}

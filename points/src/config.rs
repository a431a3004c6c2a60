//! Points configuration.

use crate::types::RuleKind;

/// Ledger engine configuration.
#[derive(Debug, Clone)]
pub struct PointsConfig {
    /// Award for a check-in when no active rule overrides it.
    ///
    /// Default: 10 points.
    pub default_checkin_points: i64,
}

impl PointsConfig {
    /// Create a configuration with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_checkin_points: 10,
        }
    }

    /// Set the default check-in award.
    #[must_use]
    pub const fn with_default_checkin_points(mut self, points: i64) -> Self {
        self.default_checkin_points = points;
        self
    }

    /// Fallback award when no active rule exists for `kind`.
    ///
    /// Only check-ins carry a non-zero default; every other kind awards
    /// nothing unless an organiser configured a rule.
    #[must_use]
    pub const fn default_points(&self, kind: RuleKind) -> i64 {
        match kind {
            RuleKind::Checkin => self.default_checkin_points,
            RuleKind::ManualBonus => 0,
        }
    }
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_checkins_have_a_nonzero_default() {
        let config = PointsConfig::new();
        assert_eq!(config.default_points(RuleKind::Checkin), 10);
        assert_eq!(config.default_points(RuleKind::ManualBonus), 0);
    }

    #[test]
    fn default_award_is_overridable() {
        let config = PointsConfig::new().with_default_checkin_points(25);
        assert_eq!(config.default_points(RuleKind::Checkin), 25);
    }
}

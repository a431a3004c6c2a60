//! Typed capability context.
//!
//! Every authenticated request carries one of these instead of an
//! ad-hoc claims dictionary. The role set is closed; the org scope is
//! an explicit list checked by [`CapabilityContext::can_manage_org`].

use crate::ids::{OrgId, UserId};
use serde::{Deserialize, Serialize};

/// Closed set of actor roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Participant who scans QR codes and redeems vouchers.
    Attendee,
    /// Operator of one or more organisations.
    Organiser,
    /// Trusted service-to-service identity.
    Service,
}

impl Role {
    /// Stable string form, as carried in token claims.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attendee => "attendee",
            Self::Organiser => "organiser",
            Self::Service => "service",
        }
    }
}

/// The capability set attached to a verified request.
///
/// Built from identity-token claims by `trailpass-credential` and
/// passed explicitly into every operation that needs an authorization
/// decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityContext {
    /// The authenticated subject.
    pub subject: UserId,
    /// The subject's role.
    pub role: Role,
    /// Organisations the subject is scoped to. Empty means global for
    /// service identities and no scope at all for everyone else.
    pub org_ids: Vec<OrgId>,
}

impl CapabilityContext {
    /// Create a context.
    #[must_use]
    pub const fn new(subject: UserId, role: Role, org_ids: Vec<OrgId>) -> Self {
        Self {
            subject,
            role,
            org_ids,
        }
    }

    /// Whether this actor may manage resources belonging to `org`.
    ///
    /// Organisers need explicit membership. Service identities pass
    /// with an empty scope (global) or explicit membership. Attendees
    /// never manage org resources.
    #[must_use]
    pub fn can_manage_org(&self, org: OrgId) -> bool {
        match self.role {
            Role::Organiser => self.org_ids.contains(&org),
            Role::Service => self.org_ids.is_empty() || self.org_ids.contains(&org),
            Role::Attendee => false,
        }
    }

    /// The actor's primary organisation, if any.
    #[must_use]
    pub fn primary_org(&self) -> Option<OrgId> {
        self.org_ids.first().copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ctx(role: Role, org_ids: Vec<OrgId>) -> CapabilityContext {
        CapabilityContext::new(UserId::new(), role, org_ids)
    }

    #[test]
    fn organiser_requires_explicit_membership() {
        let org = OrgId::new();
        let other = OrgId::new();
        let c = ctx(Role::Organiser, vec![org]);
        assert!(c.can_manage_org(org));
        assert!(!c.can_manage_org(other));
    }

    #[test]
    fn service_with_empty_scope_is_global() {
        let c = ctx(Role::Service, vec![]);
        assert!(c.can_manage_org(OrgId::new()));
    }

    #[test]
    fn service_with_scope_is_bounded() {
        let org = OrgId::new();
        let c = ctx(Role::Service, vec![org]);
        assert!(c.can_manage_org(org));
        assert!(!c.can_manage_org(OrgId::new()));
    }

    #[test]
    fn attendee_never_manages() {
        let org = OrgId::new();
        let c = ctx(Role::Attendee, vec![org]);
        assert!(!c.can_manage_org(org));
    }

    #[test]
    fn role_round_trips_through_serde() {
        for role in [Role::Attendee, Role::Organiser, Role::Service] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }
}

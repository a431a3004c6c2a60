//! Typed identifiers.
//!
//! Plain UUIDs behind newtypes so a trail id cannot be handed to an API
//! expecting a user id. All of them serialize transparently as UUID
//! strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a participant.
    UserId
}

uuid_id! {
    /// Unique identifier for an organisation.
    OrgId
}

uuid_id! {
    /// Unique identifier for a trail (the event being checked into).
    TrailId
}

uuid_id! {
    /// Unique identifier for a voucher.
    VoucherId
}

impl OrgId {
    /// Sentinel scope for system-wide aggregates and ranks.
    ///
    /// The nil UUID rather than SQL NULL, so uniqueness constraints on
    /// `(period, scope, user)` hold for the system scope too.
    #[must_use]
    pub const fn system_scope() -> Self {
        Self(uuid::Uuid::nil())
    }

    /// Whether this scope is the system-wide sentinel.
    #[must_use]
    pub fn is_system_scope(&self) -> bool {
        self.0.is_nil()
    }
}

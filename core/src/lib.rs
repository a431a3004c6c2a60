//! Shared domain types for the Trailpass attendance/rewards pipeline.
//!
//! This crate holds the vocabulary the other crates speak to each other:
//! typed identifiers, the capability context attached to every
//! authenticated request, the check-in fact that travels over the bus,
//! the monthly period used by aggregates and ranks, and the [`FactBus`]
//! abstraction the relay implements.
//!
//! Everything here is intentionally free of I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bus;
pub mod capability;
pub mod fact;
pub mod ids;
pub mod period;

pub use bus::{FactBus, FactBusError, NullFactBus};
pub use capability::{CapabilityContext, Role};
pub use fact::CheckinFact;
pub use ids::{OrgId, TrailId, UserId, VoucherId};
pub use period::Period;

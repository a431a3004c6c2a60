//! Ledger, rule, voucher and redemption types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trailpass_core::{OrgId, TrailId, UserId, VoucherId};
use uuid::Uuid;

/// Why a ledger entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    /// Automatic award for a recorded check-in.
    Checkin,
    /// Organiser-initiated manual adjustment.
    ManualAdjust,
    /// Debit for a voucher redemption.
    VoucherRedeem,
}

impl LedgerReason {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::ManualAdjust => "manual_adjust",
            Self::VoucherRedeem => "voucher_redeem",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "checkin" => Some(Self::Checkin),
            "manual_adjust" => Some(Self::ManualAdjust),
            "voucher_redeem" => Some(Self::VoucherRedeem),
            _ => None,
        }
    }
}

/// Which operation an award rule prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Points for a check-in.
    Checkin,
    /// Points an organiser may grant by hand.
    ManualBonus,
}

impl RuleKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkin => "checkin",
            Self::ManualBonus => "manual_bonus",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "checkin" => Some(Self::Checkin),
            "manual_bonus" => Some(Self::ManualBonus),
            _ => None,
        }
    }
}

/// One append-only ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Row id.
    pub id: Uuid,
    /// The participant.
    pub user_id: UserId,
    /// The organisation scope.
    pub org_id: OrgId,
    /// Signed points delta.
    pub delta: i64,
    /// Why this entry exists.
    pub reason: LedgerReason,
    /// Source trail, for check-in awards.
    pub trail_id: Option<TrailId>,
    /// Free-form note.
    pub details: Option<String>,
    /// When the entry was committed.
    pub occurred_at: DateTime<Utc>,
}

/// Derived balance for a (participant, organisation) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// The participant.
    pub user_id: UserId,
    /// The organisation scope.
    pub org_id: OrgId,
    /// Current amount; never negative in committed state.
    pub amount: i64,
    /// Last mutation time, if the row exists.
    pub updated_at: Option<DateTime<Utc>>,
}

/// An organiser-configured award rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardRule {
    /// Row id.
    pub id: Uuid,
    /// Owning organisation.
    pub org_id: OrgId,
    /// Which operation this rule prices.
    pub kind: RuleKind,
    /// The award amount.
    pub points: i64,
    /// Inactive rules are ignored by resolution.
    pub active: bool,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update; resolution prefers the most recently updated rule.
    pub updated_at: DateTime<Utc>,
}

/// Voucher lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Redeemable.
    Active,
    /// Hidden from redemption.
    Disabled,
}

impl VoucherStatus {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// A redeemable voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher id.
    pub id: VoucherId,
    /// Owning organisation.
    pub org_id: OrgId,
    /// Unique human-facing code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Points debited per redemption; always positive.
    pub points_cost: i64,
    /// Lifecycle status.
    pub status: VoucherStatus,
    /// Stock cap; `None` means unlimited.
    pub total_quantity: Option<i64>,
    /// Redemptions so far; never exceeds the cap.
    pub redeemed_count: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// A committed redemption.
///
/// Created atomically with its ledger debit and the voucher's counter
/// increment; the three commit or fail together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    /// Row id.
    pub id: Uuid,
    /// The redeemed voucher.
    pub voucher_id: VoucherId,
    /// The redeeming participant.
    pub user_id: UserId,
    /// The organisation scope.
    pub org_id: OrgId,
    /// Redemption status (currently always `"redeemed"`).
    pub status: String,
    /// When the redemption committed.
    pub redeemed_at: DateTime<Utc>,
}

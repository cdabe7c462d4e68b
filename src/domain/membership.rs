//! Membership and join code models

use super::common::{varchar_enum, StringUuid};
use super::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Pending,
}

impl std::str::FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(MembershipStatus::Active),
            "inactive" => Ok(MembershipStatus::Inactive),
            "suspended" => Ok(MembershipStatus::Suspended),
            "pending" => Ok(MembershipStatus::Pending),
            _ => Err(format!("Unknown membership status: {}", s)),
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MembershipStatus::Active => write!(f, "active"),
            MembershipStatus::Inactive => write!(f, "inactive"),
            MembershipStatus::Suspended => write!(f, "suspended"),
            MembershipStatus::Pending => write!(f, "pending"),
        }
    }
}

varchar_enum!(MembershipStatus);

/// Role and status of a user inside one tenant. Unique per (tenant, user).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: StringUuid,
    pub tenant_id: StringUuid,
    pub user_id: StringUuid,
    pub role: Role,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
    pub join_code_used: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMembership {
    pub user_id: StringUuid,
    pub role: Role,
    pub status: MembershipStatus,
    pub join_code_used: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipInput {
    pub role: Option<Role>,
    pub status: Option<MembershipStatus>,
}

/// Shareable code that binds a registering user to a tenant with a role.
///
/// `expires_at` and `max_uses` are recorded but redemption does not check
/// them; only `is_active` gates resolution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct JoinCode {
    pub id: StringUuid,
    pub tenant_id: StringUuid,
    pub code: String,
    pub role_granted: Role,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub usage_count: i32,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_by: Option<StringUuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJoinCode {
    pub tenant_id: StringUuid,
    pub code: String,
    pub role_granted: Role,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub description: Option<String>,
    pub created_by: Option<StringUuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJoinCodeInput {
    pub role_granted: Option<Role>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

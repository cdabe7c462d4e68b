//! Tenant (church) domain model

use super::common::{varchar_enum, StringUuid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Tenant status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Suspended,
    #[default]
    Trial,
    Expired,
}

impl TenantStatus {
    /// Only active and trial churches accept join-code registrations
    pub fn accepts_members(self) -> bool {
        matches!(self, TenantStatus::Active | TenantStatus::Trial)
    }
}

impl std::str::FromStr for TenantStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(TenantStatus::Active),
            "suspended" => Ok(TenantStatus::Suspended),
            "trial" => Ok(TenantStatus::Trial),
            "expired" => Ok(TenantStatus::Expired),
            _ => Err(format!("Unknown tenant status: {}", s)),
        }
    }
}

impl std::fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenantStatus::Active => write!(f, "active"),
            TenantStatus::Suspended => write!(f, "suspended"),
            TenantStatus::Trial => write!(f, "trial"),
            TenantStatus::Expired => write!(f, "expired"),
        }
    }
}

varchar_enum!(TenantStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl std::str::FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionPlan::Free),
            "basic" => Ok(SubscriptionPlan::Basic),
            "pro" => Ok(SubscriptionPlan::Pro),
            "enterprise" => Ok(SubscriptionPlan::Enterprise),
            _ => Err(format!("Unknown subscription plan: {}", s)),
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionPlan::Free => write!(f, "free"),
            SubscriptionPlan::Basic => write!(f, "basic"),
            SubscriptionPlan::Pro => write!(f, "pro"),
            SubscriptionPlan::Enterprise => write!(f, "enterprise"),
        }
    }
}

varchar_enum!(SubscriptionPlan);

/// Feature toggles and locale, stored as JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantSettings {
    pub allow_public_registration: bool,
    pub require_email_verification: bool,
    pub require_phone_verification: bool,
    pub enable_donations: bool,
    pub enable_events: bool,
    pub enable_groups: bool,
    pub enable_prayer: bool,
    pub enable_sermons: bool,
    pub enable_bible: bool,
    pub timezone: String,
    pub language: String,
    pub currency: String,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            allow_public_registration: true,
            require_email_verification: false,
            require_phone_verification: false,
            enable_donations: true,
            enable_events: true,
            enable_groups: true,
            enable_prayer: true,
            enable_sermons: true,
            enable_bible: true,
            timezone: "UTC".to_string(),
            language: "en".to_string(),
            currency: "USD".to_string(),
        }
    }
}

/// Partial settings update; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettingsPatch {
    pub allow_public_registration: Option<bool>,
    pub require_email_verification: Option<bool>,
    pub require_phone_verification: Option<bool>,
    pub enable_donations: Option<bool>,
    pub enable_events: Option<bool>,
    pub enable_groups: Option<bool>,
    pub enable_prayer: Option<bool>,
    pub enable_sermons: Option<bool>,
    pub enable_bible: Option<bool>,
    pub timezone: Option<String>,
    pub language: Option<String>,
    pub currency: Option<String>,
}

impl TenantSettings {
    pub fn apply(&mut self, patch: TenantSettingsPatch) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }
        merge!(
            allow_public_registration,
            require_email_verification,
            require_phone_verification,
            enable_donations,
            enable_events,
            enable_groups,
            enable_prayer,
            enable_sermons,
            enable_bible,
            timezone,
            language,
            currency
        );
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantBranding {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub logo_url: Option<String>,
}

impl Default for TenantBranding {
    fn default() -> Self {
        Self {
            primary_color: "#4F46E5".to_string(),
            secondary_color: "#7C3AED".to_string(),
            accent_color: "#EC4899".to_string(),
            font_family: "Inter".to_string(),
            logo_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBrandingPatch {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub font_family: Option<String>,
    pub logo_url: Option<String>,
}

impl TenantBranding {
    pub fn apply(&mut self, patch: TenantBrandingPatch) {
        if let Some(v) = patch.primary_color {
            self.primary_color = v;
        }
        if let Some(v) = patch.secondary_color {
            self.secondary_color = v;
        }
        if let Some(v) = patch.accent_color {
            self.accent_color = v;
        }
        if let Some(v) = patch.font_family {
            self.font_family = v;
        }
        if patch.logo_url.is_some() {
            self.logo_url = patch.logo_url;
        }
    }
}

/// Tenant entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: StringUuid,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub denomination: Option<String>,
    pub website: Option<String>,
    pub join_code: String,
    pub status: TenantStatus,
    pub subscription_plan: SubscriptionPlan,
    pub member_count: i64,
    #[sqlx(json)]
    pub settings: TenantSettings,
    #[sqlx(json)]
    pub branding: TenantBranding,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Tenant {
    fn default() -> Self {
        Self {
            id: StringUuid::new_v4(),
            name: String::new(),
            slug: String::new(),
            email: String::new(),
            phone: None,
            address: None,
            denomination: None,
            website: None,
            join_code: String::new(),
            status: TenantStatus::default(),
            subscription_plan: SubscriptionPlan::default(),
            member_count: 0,
            settings: TenantSettings::default(),
            branding: TenantBranding::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// Input for creating a tenant (church signup)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantInput {
    #[validate(length(min = 2, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub denomination: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub subscription_plan: Option<SubscriptionPlan>,
}

/// Fully-resolved row handed to the repository on insert
#[derive(Debug, Clone)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub denomination: Option<String>,
    pub website: Option<String>,
    pub join_code: String,
    pub status: TenantStatus,
    pub subscription_plan: SubscriptionPlan,
    pub settings: TenantSettings,
    pub branding: TenantBranding,
}

/// Input for updating a tenant
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantInput {
    #[validate(length(min = 2, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub denomination: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    pub status: Option<TenantStatus>,
    pub subscription_plan: Option<SubscriptionPlan>,
    pub settings: Option<TenantSettingsPatch>,
    pub branding: Option<TenantBrandingPatch>,
}

/// Body of `POST /tenants/join`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinTenantInput {
    #[validate(length(min = 1, max = 32))]
    pub join_code: String,
}

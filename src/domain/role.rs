//! Roles and permission tokens

use super::common::varchar_enum;
use serde::{Deserialize, Serialize};

/// Role of a principal. Numeric levels order privilege but route gating uses
/// explicit role sets (see `policy::authorize`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    ChurchAdmin,
    Clergy,
    Leader,
    Member,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::ChurchAdmin,
        Role::Clergy,
        Role::Leader,
        Role::Member,
    ];

    /// Hierarchy level, higher is more privileged
    pub fn level(self) -> u8 {
        match self {
            Role::SuperAdmin => 5,
            Role::ChurchAdmin => 4,
            Role::Clergy => 3,
            Role::Leader => 2,
            Role::Member => 1,
        }
    }

    pub fn at_least(self, other: Role) -> bool {
        self.level() >= other.level()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::ChurchAdmin => "church_admin",
            Role::Clergy => "clergy",
            Role::Leader => "leader",
            Role::Member => "member",
        }
    }

    /// Roles that can be held inside a tenant (everything but super_admin)
    pub fn is_tenant_role(self) -> bool {
        self != Role::SuperAdmin
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "church_admin" => Ok(Role::ChurchAdmin),
            "clergy" => Ok(Role::Clergy),
            "leader" => Ok(Role::Leader),
            "member" => Ok(Role::Member),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

varchar_enum!(Role);

/// Fine-grained permission tokens, serialized as `verb:resource`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "create:tenant")]
    CreateTenant,
    #[serde(rename = "update:tenant")]
    UpdateTenant,
    #[serde(rename = "delete:tenant")]
    DeleteTenant,
    #[serde(rename = "manage:join_codes")]
    ManageJoinCodes,
    #[serde(rename = "manage:users")]
    ManageUsers,
    #[serde(rename = "view:users")]
    ViewUsers,
    #[serde(rename = "create:post")]
    CreatePost,
    #[serde(rename = "delete:any_post")]
    DeleteAnyPost,
    #[serde(rename = "create:event")]
    CreateEvent,
    #[serde(rename = "manage:events")]
    ManageEvents,
    #[serde(rename = "create:sermon")]
    CreateSermon,
    #[serde(rename = "manage:sermons")]
    ManageSermons,
    #[serde(rename = "manage:worship")]
    ManageWorship,
    #[serde(rename = "create:group")]
    CreateGroup,
    #[serde(rename = "manage:groups")]
    ManageGroups,
    #[serde(rename = "view:donations")]
    ViewDonations,
    #[serde(rename = "manage:donations")]
    ManageDonations,
    #[serde(rename = "manage:settings")]
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 18] = [
        Permission::CreateTenant,
        Permission::UpdateTenant,
        Permission::DeleteTenant,
        Permission::ManageJoinCodes,
        Permission::ManageUsers,
        Permission::ViewUsers,
        Permission::CreatePost,
        Permission::DeleteAnyPost,
        Permission::CreateEvent,
        Permission::ManageEvents,
        Permission::CreateSermon,
        Permission::ManageSermons,
        Permission::ManageWorship,
        Permission::CreateGroup,
        Permission::ManageGroups,
        Permission::ViewDonations,
        Permission::ManageDonations,
        Permission::ManageSettings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::CreateTenant => "create:tenant",
            Permission::UpdateTenant => "update:tenant",
            Permission::DeleteTenant => "delete:tenant",
            Permission::ManageJoinCodes => "manage:join_codes",
            Permission::ManageUsers => "manage:users",
            Permission::ViewUsers => "view:users",
            Permission::CreatePost => "create:post",
            Permission::DeleteAnyPost => "delete:any_post",
            Permission::CreateEvent => "create:event",
            Permission::ManageEvents => "manage:events",
            Permission::CreateSermon => "create:sermon",
            Permission::ManageSermons => "manage:sermons",
            Permission::ManageWorship => "manage:worship",
            Permission::CreateGroup => "create:group",
            Permission::ManageGroups => "manage:groups",
            Permission::ViewDonations => "view:donations",
            Permission::ManageDonations => "manage:donations",
            Permission::ManageSettings => "manage:settings",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

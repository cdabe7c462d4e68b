//! Centralized authorization policy for HTTP routes.
//!
//! Route gating uses explicit role sets. Hierarchy levels on [`Role`] exist
//! for display and comparisons but never decide access here.

use crate::domain::{Permission, Role};
use crate::error::{AppError, Result};

/// Platform operators only
pub const SUPER_ADMIN: &[Role] = &[Role::SuperAdmin];
pub const CHURCH_ADMIN: &[Role] = &[Role::ChurchAdmin];
pub const ADMIN_CLERGY: &[Role] = &[Role::ChurchAdmin, Role::Clergy];
pub const ADMIN_CLERGY_LEADER: &[Role] = &[Role::ChurchAdmin, Role::Clergy, Role::Leader];
/// Every tenant role
pub const MEMBERS: &[Role] = &[Role::ChurchAdmin, Role::Clergy, Role::Leader, Role::Member];
/// Any authenticated principal
pub const ANY_ROLE: &[Role] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantRequirement {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    Public,
    Authenticated,
}

/// Context requirements declared once per route group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePolicy {
    pub tenant: TenantRequirement,
    pub auth: AuthRequirement,
    pub roles: &'static [Role],
}

impl RoutePolicy {
    /// No token; tenant header bound if present
    pub const PUBLIC: RoutePolicy = RoutePolicy {
        tenant: TenantRequirement::Optional,
        auth: AuthRequirement::Public,
        roles: ANY_ROLE,
    };

    /// Valid access token, tenant optional
    pub const AUTHENTICATED: RoutePolicy = RoutePolicy {
        tenant: TenantRequirement::Optional,
        auth: AuthRequirement::Authenticated,
        roles: ANY_ROLE,
    };

    /// Valid access token with a resolved tenant and one of `roles`
    pub const fn tenant(roles: &'static [Role]) -> Self {
        Self {
            tenant: TenantRequirement::Required,
            auth: AuthRequirement::Authenticated,
            roles,
        }
    }

    /// Valid access token with one of `roles`, tenant optional
    pub const fn authenticated(roles: &'static [Role]) -> Self {
        Self {
            tenant: TenantRequirement::Optional,
            auth: AuthRequirement::Authenticated,
            roles,
        }
    }
}

/// Set-membership check. `super_admin` passes every gate and an empty
/// `required` set admits any authenticated role.
pub fn authorize(role: Role, required: &[Role]) -> Result<()> {
    if role == Role::SuperAdmin || required.is_empty() || required.contains(&role) {
        return Ok(());
    }
    Err(AppError::Forbidden("Insufficient permissions".to_string()))
}

pub fn permissions(role: Role) -> &'static [Permission] {
    use Permission::*;
    match role {
        Role::SuperAdmin => &Permission::ALL,
        Role::ChurchAdmin => &[
            UpdateTenant,
            ManageJoinCodes,
            ManageUsers,
            ViewUsers,
            DeleteAnyPost,
            ManageEvents,
            ManageSermons,
            ManageWorship,
            ManageGroups,
            ViewDonations,
            ManageDonations,
            ManageSettings,
        ],
        Role::Clergy => &[ViewUsers, CreateEvent, CreateSermon, ManageWorship, CreateGroup],
        Role::Leader => &[CreatePost, CreateGroup],
        Role::Member => &[CreatePost],
    }
}

pub fn has_permission(role: Role, permission: Permission) -> bool {
    permissions(role).contains(&permission)
}

/// Routes addressing a tenant by path id may only touch the caller's own
/// tenant. `super_admin` may address any tenant.
pub fn authorize_tenant_target(role: Role, caller_tenant: Option<&str>, target: &str) -> Result<()> {
    if role == Role::SuperAdmin || caller_tenant == Some(target) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Cannot access another church".to_string(),
    ))
}

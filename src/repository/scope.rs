//! Tenant-bound handle required by every tenant-owned query

use crate::domain::StringUuid;

/// Proof that a tenant has been resolved for the current operation.
///
/// Every scoped repository method takes `&TenantScope`, and the store adds
/// `tenant_id = ?` from it to every statement it issues. Handlers obtain one
/// from the request context extractor; services that act for a known tenant
/// (e.g. registration) bind one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantScope {
    tenant_id: StringUuid,
}

impl TenantScope {
    pub fn bind(tenant_id: StringUuid) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> StringUuid {
        self.tenant_id
    }
}

impl std::fmt::Display for TenantScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.tenant_id.fmt(f)
    }
}

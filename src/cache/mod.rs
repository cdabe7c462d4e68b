//! Redis cache layer
//!
//! The cache is a best-effort side channel: callers treat every error as a
//! miss, and a cache that cannot connect at startup is replaced by
//! [`NoOpCacheManager`].

use crate::config::RedisConfig;
use crate::domain::{StringUuid, Tenant};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Cache key prefixes
mod keys {
    pub const TENANT: &str = "tenant";
    pub const TENANT_SLUG: &str = "tenant:slug";
}

/// Default TTLs
mod ttl {
    pub const TENANT_SECS: u64 = 3600; // 1 hour
}

pub fn tenant_key(tenant_id: StringUuid) -> String {
    format!("{}:{}", keys::TENANT, tenant_id)
}

/// Slug index entry holding the tenant id
pub fn tenant_slug_key(slug: &str) -> String {
    format!("{}:{}", keys::TENANT_SLUG, slug)
}

/// Operations the services need from a cache backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheOperations: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn get_tenant(&self, tenant_id: StringUuid) -> Result<Option<Tenant>>;
    async fn get_tenant_id_by_slug(&self, slug: &str) -> Result<Option<StringUuid>>;
    /// Stores the tenant and its slug index entry
    async fn set_tenant(&self, tenant: &Tenant) -> Result<()>;
    async fn invalidate_tenant(&self, tenant_id: StringUuid) -> Result<()>;
}

/// Cache manager for Redis operations
#[derive(Clone)]
pub struct CacheManager {
    conn: ConnectionManager,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create Redis client: {}", e))
        })?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { conn })
    }

    /// Get a value from cache
    async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => {
                let parsed = serde_json::from_str(&v).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Cache deserialize error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with TTL
    async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let serialized = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cache serialize error: {}", e)))?;

        let _: () = conn.set_ex(key, serialized, ttl.as_secs()).await?;
        Ok(())
    }

    /// Delete a key from cache
    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

fn record(operation: &'static str, ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!(
        "ecclesia_cache_operations_total",
        "operation" => operation,
        "result" => result
    )
    .increment(1);
}

#[async_trait]
impl CacheOperations for CacheManager {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn get_tenant(&self, tenant_id: StringUuid) -> Result<Option<Tenant>> {
        let result = self.get(&tenant_key(tenant_id)).await;
        let operation = match &result {
            Ok(Some(_)) => "get_hit",
            _ => "get_miss",
        };
        record(operation, result.is_ok());
        result
    }

    async fn get_tenant_id_by_slug(&self, slug: &str) -> Result<Option<StringUuid>> {
        let result = self.get(&tenant_slug_key(slug)).await;
        let operation = match &result {
            Ok(Some(_)) => "slug_hit",
            _ => "slug_miss",
        };
        record(operation, result.is_ok());
        result
    }

    async fn set_tenant(&self, tenant: &Tenant) -> Result<()> {
        let ttl = Duration::from_secs(ttl::TENANT_SECS);
        let result = match self.set(&tenant_key(tenant.id), tenant, ttl).await {
            Ok(()) => self.set(&tenant_slug_key(&tenant.slug), &tenant.id, ttl).await,
            Err(e) => Err(e),
        };
        record("set", result.is_ok());
        result
    }

    async fn invalidate_tenant(&self, tenant_id: StringUuid) -> Result<()> {
        let result = self.delete(&tenant_key(tenant_id)).await;
        record("invalidate", result.is_ok());
        result
    }
}

/// Cache that stores nothing. Used when Redis is unavailable and in tests.
#[derive(Clone, Default)]
pub struct NoOpCacheManager;

impl NoOpCacheManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheOperations for NoOpCacheManager {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_tenant(&self, _tenant_id: StringUuid) -> Result<Option<Tenant>> {
        Ok(None)
    }

    async fn get_tenant_id_by_slug(&self, _slug: &str) -> Result<Option<StringUuid>> {
        Ok(None)
    }

    async fn set_tenant(&self, _tenant: &Tenant) -> Result<()> {
        Ok(())
    }

    async fn invalidate_tenant(&self, _tenant_id: StringUuid) -> Result<()> {
        Ok(())
    }
}

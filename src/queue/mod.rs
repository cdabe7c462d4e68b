//! Redis-backed job queue

use crate::config::{QueueConfig, RedisConfig};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job as it sits on the queue list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub name: String,
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
}

impl Job {
    pub fn new(name: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            payload,
            enqueued_at: Utc::now(),
            attempts: 0,
        }
    }
}

/// Queue producer interface. Consumers live outside this service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Push a named job onto `queue` and return its id
    async fn enqueue(
        &self,
        queue: &str,
        job_name: &str,
        payload: serde_json::Value,
    ) -> Result<String>;
}

#[derive(Clone)]
pub struct RedisJobQueue {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisJobQueue {
    pub async fn new(redis: &RedisConfig, queue: &QueueConfig) -> Result<Self> {
        let client = redis::Client::open(redis.url.as_str()).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create Redis client: {}", e))
        })?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            conn,
            key_prefix: queue.key_prefix.clone(),
        })
    }

    pub fn queue_key(&self, queue: &str) -> String {
        queue_key(&self.key_prefix, queue)
    }
}

fn queue_key(prefix: &str, queue: &str) -> String {
    format!("{}:{}", prefix, queue)
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(
        &self,
        queue: &str,
        job_name: &str,
        payload: serde_json::Value,
    ) -> Result<String> {
        let job = Job::new(job_name, payload);
        let serialized = serde_json::to_string(&job)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Job serialize error: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: i64 = conn.lpush(self.queue_key(queue), serialized).await?;
        tracing::debug!(queue = %queue, job = %job_name, job_id = %job.id, "Job enqueued");
        Ok(job.id)
    }
}

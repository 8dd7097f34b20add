//! Per-user session hints.
//!
//! Redis when `REDIS_URL` is set and reachable at startup; otherwise a
//! process-local map. Both backends expire entries after 24 hours.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::category::Category;
use crate::models::user::UserProfile;

pub const SESSION_TTL_SECS: u64 = 86_400;
const KEY_PREFIX: &str = "session:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub categories: Vec<Category>,
    #[serde(default)]
    pub business_summary: String,
    pub updated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            categories: profile.categories.clone(),
            business_summary: profile.business_summary.clone(),
            updated_at: Utc::now(),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.updated_at > Duration::seconds(SESSION_TTL_SECS as i64)
    }
}

#[derive(Clone)]
enum Backend {
    Redis(redis::Client),
    Memory(Arc<RwLock<HashMap<String, UserSession>>>),
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Backend,
}

fn session_key(user_id: &str) -> String {
    format!("{KEY_PREFIX}{user_id}")
}

impl SessionStore {
    /// Connects to Redis and checks it with a PING. Any failure falls back to
    /// the in-memory store; the service never refuses to start over sessions.
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else {
            info!("REDIS_URL not set; using in-memory session store");
            return Self::in_memory();
        };

        let client = match redis::Client::open(url) {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "invalid REDIS_URL; using in-memory session store");
                return Self::in_memory();
            }
        };

        let ping: Result<String, redis::RedisError> = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            redis::cmd("PING").query_async(&mut conn).await
        }
        .await;

        match ping {
            Ok(_) => {
                info!("Redis session store connected");
                Self {
                    backend: Backend::Redis(client),
                }
            }
            Err(e) => {
                warn!(error = %e, "redis unreachable; using in-memory session store");
                Self::in_memory()
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(HashMap::new()))),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Redis(_) => "redis",
            Backend::Memory(_) => "memory",
        }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<UserSession>, AppError> {
        match &self.backend {
            Backend::Redis(client) => {
                let mut conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|e| AppError::Session(format!("redis connection failed: {e}")))?;
                let raw: Option<String> = conn
                    .get(session_key(user_id))
                    .await
                    .map_err(|e| AppError::Session(format!("redis GET failed: {e}")))?;

                // A corrupt entry is treated as absent; it is overwritten on the next put.
                Ok(raw.and_then(|raw| {
                    serde_json::from_str(&raw)
                        .inspect_err(|e| warn!(error = %e, user_id, "discarding unreadable session"))
                        .ok()
                }))
            }
            Backend::Memory(map) => {
                let now = Utc::now();
                {
                    let guard = map.read().await;
                    match guard.get(user_id) {
                        None => return Ok(None),
                        Some(session) if !session.is_expired(now) => {
                            return Ok(Some(session.clone()))
                        }
                        Some(_) => {}
                    }
                }
                map.write().await.remove(user_id);
                Ok(None)
            }
        }
    }

    pub async fn put(&self, user_id: &str, session: &UserSession) -> Result<(), AppError> {
        match &self.backend {
            Backend::Redis(client) => {
                let value = serde_json::to_string(session)
                    .map_err(|e| AppError::Session(format!("serialize session: {e}")))?;
                let mut conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|e| AppError::Session(format!("redis connection failed: {e}")))?;
                redis::cmd("SETEX")
                    .arg(session_key(user_id))
                    .arg(SESSION_TTL_SECS)
                    .arg(value)
                    .query_async::<_, ()>(&mut conn)
                    .await
                    .map_err(|e| AppError::Session(format!("redis SETEX failed: {e}")))
            }
            Backend::Memory(map) => {
                map.write()
                    .await
                    .insert(user_id.to_string(), session.clone());
                Ok(())
            }
        }
    }

    /// Returns whether an entry existed.
    pub async fn clear(&self, user_id: &str) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Redis(client) => {
                let mut conn = client
                    .get_multiplexed_async_connection()
                    .await
                    .map_err(|e| AppError::Session(format!("redis connection failed: {e}")))?;
                let removed: u32 = conn
                    .del(session_key(user_id))
                    .await
                    .map_err(|e| AppError::Session(format!("redis DEL failed: {e}")))?;
                Ok(removed > 0)
            }
            Backend::Memory(map) => Ok(map.write().await.remove(user_id).is_some()),
        }
    }
}

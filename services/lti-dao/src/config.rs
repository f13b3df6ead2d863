use anyhow::anyhow;
use chrono::Duration;

use kaltura_core::config::{parsed_or, required, string_or};

use crate::domain::types::{DEFAULT_AUTHCODE_TTL_SECS, JOB_STATUS_NEW, MAX_AUTHCODE_TTL_SECS};

/// Persistence configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DaoConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// Lifetime given to auth codes whose expiry is rebuilt (default 3600 s, at most
    /// one year). Env var: `AUTH_CODE_TTL_SECS`.
    pub auth_code_ttl: Duration,
    /// Status polled as the site copy work queue (default "new"). Env var: `WORK_QUEUE_STATUS`.
    pub work_queue_status: String,
}

impl DaoConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let ttl_secs = parsed_or("AUTH_CODE_TTL_SECS", DEFAULT_AUTHCODE_TTL_SECS)?;
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            auth_code_ttl: auth_code_ttl(ttl_secs)?,
            work_queue_status: string_or("WORK_QUEUE_STATUS", JOB_STATUS_NEW),
        })
    }
}

fn auth_code_ttl(secs: i64) -> anyhow::Result<Duration> {
    if !(1..=MAX_AUTHCODE_TTL_SECS).contains(&secs) {
        anyhow::bail!("AUTH_CODE_TTL_SECS must be between 1 and {MAX_AUTHCODE_TTL_SECS}, got {secs}");
    }
    Duration::try_seconds(secs).ok_or_else(|| anyhow!("AUTH_CODE_TTL_SECS out of range: {secs}"))
}

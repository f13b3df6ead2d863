use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use serde::Serialize;

use crate::error::DaoError;

/// Generated auth code length in characters.
pub const AUTHCODE_LEN: usize = 32;

/// Lifetime applied to auth codes whose expiry does not follow their creation time.
pub const DEFAULT_AUTHCODE_TTL_SECS: i64 = 3600;

/// Upper bound accepted for the rebuilt-expiry lifetime (one year).
pub const MAX_AUTHCODE_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Charset for generating random auth codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const JOB_STATUS_NEW: &str = "new";
pub const JOB_STATUS_IN_PROGRESS: &str = "in_progress";
pub const JOB_STATUS_DONE: &str = "done";
pub const JOB_STATUS_FAILED: &str = "failed";

pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..AUTHCODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

/// Authorization code allowing a user to call the Kaltura REST endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthCode {
    /// Assigned by the store on insert.
    pub id: Option<i64>,
    pub auth_code: String,
    pub user_id: String,
    pub sakai_role: Option<String>,
    pub lti_role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthCode {
    pub fn new(
        user_id: impl Into<String>,
        auth_code: impl Into<String>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            auth_code: auth_code.into(),
            user_id: user_id.into(),
            sakai_role: None,
            lti_role: None,
            created_at,
            expires_at,
        }
    }

    pub fn with_roles(mut self, sakai_role: Option<String>, lti_role: Option<String>) -> Self {
        self.sakai_role = sakai_role;
        self.lti_role = lti_role;
        self
    }

    pub fn is_valid(&self) -> bool {
        is_trimmed_nonblank(&self.auth_code)
            && is_trimmed_nonblank(&self.user_id)
            && self.expires_at > self.created_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Rebuild an invalid record into a persistable one.
    ///
    /// Trims the token and user id, generates a token when it is blank and pushes
    /// `expires_at` to `created_at + ttl` when it does not follow `created_at`.
    /// A blank user id cannot be repaired and survives normalization; callers must
    /// check [`AuthCode::is_valid`] afterwards.
    ///
    /// Fails when `created_at + ttl` falls outside the representable date range.
    pub fn normalized(self, ttl: Duration) -> Result<Self, DaoError> {
        if self.is_valid() {
            return Ok(self);
        }

        let auth_code = match self.auth_code.trim() {
            "" => generate_code(),
            code => code.to_owned(),
        };
        let expires_at = if self.expires_at > self.created_at {
            self.expires_at
        } else {
            self.created_at
                .checked_add_signed(ttl)
                .ok_or(DaoError::InvalidArgument("auth code expiry out of range"))?
        };

        Ok(Self {
            auth_code,
            user_id: self.user_id.trim().to_owned(),
            sakai_role: non_blank(self.sakai_role),
            lti_role: non_blank(self.lti_role),
            expires_at,
            ..self
        })
    }
}

/// A single site copy job belonging to a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCopyJob {
    /// Assigned by the store on insert.
    pub id: Option<i64>,
    pub batch_id: i64,
    pub source_site_id: String,
    pub target_site_id: String,
    /// Open status string; see the `JOB_STATUS_*` constants for the well-known values.
    pub status: String,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SiteCopyJob {
    /// A fresh job in the `new` status.
    pub fn new(
        batch_id: i64,
        source_site_id: impl Into<String>,
        target_site_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            batch_id,
            source_site_id: source_site_id.into(),
            target_site_id: target_site_id.into(),
            status: JOB_STATUS_NEW.to_owned(),
            message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.batch_id > 0
            && !self.source_site_id.trim().is_empty()
            && !self.target_site_id.trim().is_empty()
            && !self.status.trim().is_empty()
    }
}

/// Result of persisting a site copy job.
///
/// Failures that do not come from the database itself are reported here
/// instead of through `Err`, so a caller always sees whether the row was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The row was written; carries its id.
    Saved(i64),
    /// The job failed [`SiteCopyJob::is_valid`] and was not written.
    ValidationFailed,
    /// The insert returned no id.
    InsertFailed,
    /// No row with this id existed to update.
    UpdateMissed(i64),
}

impl SaveOutcome {
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Saved(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

fn is_trimmed_nonblank(value: &str) -> bool {
    !value.is_empty() && value.trim() == value
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

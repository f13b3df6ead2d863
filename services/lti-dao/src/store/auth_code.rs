use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

use crate::domain::repository::{AuthCodeFilter, Record, Repository};
use crate::domain::types::{AuthCode, DEFAULT_AUTHCODE_TTL_SECS};
use crate::error::DaoError;

/// Lookup and creation of auth codes gating the Kaltura REST endpoints.
pub struct AuthCodeStore<R> {
    repo: R,
    ttl: Duration,
}

impl<R> AuthCodeStore<R>
where
    R: Repository<AuthCode, Filter = AuthCodeFilter>,
{
    pub fn new(repo: R) -> Self {
        Self::with_ttl(repo, Duration::seconds(DEFAULT_AUTHCODE_TTL_SECS))
    }

    /// `ttl` is the lifetime given to codes whose expiry has to be rebuilt.
    pub fn with_ttl(repo: R, ttl: Duration) -> Self {
        Self { repo, ttl }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub async fn get_auth_code(&self, id: i64) -> Result<Option<AuthCode>, DaoError> {
        self.repo.find_one(&AuthCodeFilter::Id(id)).await
    }

    pub async fn get_auth_code_by_code(&self, code: &str) -> Result<Option<AuthCode>, DaoError> {
        self.repo
            .find_one(&AuthCodeFilter::Code(code.to_owned()))
            .await
    }

    pub async fn get_auth_code_for_user(
        &self,
        code: &str,
        user_id: &str,
    ) -> Result<Option<AuthCode>, DaoError> {
        self.repo
            .find_one(&AuthCodeFilter::CodeAndUser {
                code: code.to_owned(),
                user_id: user_id.to_owned(),
            })
            .await
    }

    /// Like [`Self::get_auth_code_by_code`] but hides codes that expired at `now`.
    pub async fn get_active_auth_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthCode>, DaoError> {
        let found = self.get_auth_code_by_code(code).await?;
        Ok(found.filter(|c| {
            let expired = c.is_expired_at(now);
            if expired {
                debug!(auth_code_id = ?c.id, expires_at = %c.expires_at, "auth code expired");
            }
            !expired
        }))
    }

    pub async fn create_auth_code(
        &self,
        user_id: &str,
        code: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<AuthCode, DaoError> {
        self.create_auth_code_from(AuthCode::new(user_id, code, created_at, expires_at))
            .await
    }

    pub async fn create_auth_code_from(&self, auth_code: AuthCode) -> Result<AuthCode, DaoError> {
        self.save(auth_code)
            .await
            .map_err(|e| with_context(e, "create auth code".to_owned()))
    }

    /// Normalize, persist and flush. Returns the stored record with its id.
    pub async fn save(&self, auth_code: AuthCode) -> Result<AuthCode, DaoError> {
        let mut auth_code = auth_code.normalized(self.ttl)?;
        if auth_code.user_id.is_empty() {
            return Err(DaoError::InvalidArgument("user id cannot be blank"));
        }

        match self.persist(&auth_code).await {
            Ok(id) => {
                auth_code.set_id(id);
                info!(auth_code_id = id, user_id = %auth_code.user_id, "persisted auth code");
                Ok(auth_code)
            }
            Err(err) => {
                error!(
                    auth_code_id = ?auth_code.id,
                    user_id = %auth_code.user_id,
                    expires_at = %auth_code.expires_at,
                    error = %err,
                    "failed to persist auth code"
                );
                Err(with_context(
                    err,
                    format!(
                        "persist auth code (id: {:?}, user_id: {})",
                        auth_code.id, auth_code.user_id
                    ),
                ))
            }
        }
    }

    pub async fn commit(&self) -> Result<(), DaoError> {
        self.repo.flush().await.inspect_err(|err| {
            error!(error = %err, "failed to flush auth codes");
        })
    }

    async fn persist(&self, auth_code: &AuthCode) -> Result<i64, DaoError> {
        let id = self
            .repo
            .upsert(auth_code)
            .await?
            .ok_or_else(|| anyhow!("no auth code row written"))?;
        self.repo.flush().await?;
        Ok(id)
    }
}

fn with_context(err: DaoError, context: String) -> DaoError {
    match err {
        DaoError::Persistence(cause) => DaoError::Persistence(cause.context(context)),
        other => other,
    }
}

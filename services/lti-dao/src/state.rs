use std::sync::Arc;

use chrono::Duration;
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

use crate::config::DaoConfig;
use crate::infra::db::{DbAuthCodeRepository, DbSiteCopyJobRepository};
use crate::store::{AuthCodeStore, SiteCopyJobStore};

/// Shared database handle plus settings, handing out SeaORM-backed stores.
#[derive(Clone)]
pub struct DaoState {
    pub db: Arc<DatabaseConnection>,
    pub auth_code_ttl: Duration,
}

impl DaoState {
    pub async fn connect(config: &DaoConfig) -> anyhow::Result<Self> {
        let db = Database::connect(&config.database_url).await?;
        info!("connected to database");
        Ok(Self {
            db: Arc::new(db),
            auth_code_ttl: config.auth_code_ttl,
        })
    }

    pub fn auth_code_store(&self) -> AuthCodeStore<DbAuthCodeRepository> {
        AuthCodeStore::with_ttl(
            DbAuthCodeRepository {
                db: Arc::clone(&self.db),
            },
            self.auth_code_ttl,
        )
    }

    pub fn site_copy_job_store(&self) -> SiteCopyJobStore<DbSiteCopyJobRepository> {
        SiteCopyJobStore::new(DbSiteCopyJobRepository {
            db: Arc::clone(&self.db),
        })
    }
}

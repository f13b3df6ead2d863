use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::Expr,
};
use tracing::trace;

use lti_dao_schema::{auth_codes, site_copy_jobs};

use crate::domain::repository::{AuthCodeFilter, Repository, SiteCopyJobFilter, StatusTransition};
use crate::domain::types::{AuthCode, SiteCopyJob};
use crate::error::DaoError;

// ── AuthCode repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthCodeRepository {
    pub db: Arc<DatabaseConnection>,
}

impl Repository<AuthCode> for DbAuthCodeRepository {
    type Filter = AuthCodeFilter;

    async fn find_one(&self, filter: &AuthCodeFilter) -> Result<Option<AuthCode>, DaoError> {
        let model = auth_code_query(filter)
            .order_by_asc(auth_codes::Column::Id)
            .one(self.db.as_ref())
            .await
            .with_context(|| format!("find auth code by {filter:?}"))?;
        Ok(model.map(auth_code_from_model))
    }

    async fn find_many(&self, filter: &AuthCodeFilter) -> Result<Vec<AuthCode>, DaoError> {
        let models = auth_code_query(filter)
            .order_by_asc(auth_codes::Column::Id)
            .all(self.db.as_ref())
            .await
            .with_context(|| format!("list auth codes by {filter:?}"))?;
        Ok(models.into_iter().map(auth_code_from_model).collect())
    }

    async fn upsert(&self, record: &AuthCode) -> Result<Option<i64>, DaoError> {
        let active = auth_codes::ActiveModel {
            id: record.id.map_or(NotSet, Set),
            auth_code: Set(record.auth_code.clone()),
            user_id: Set(record.user_id.clone()),
            sakai_role: Set(record.sakai_role.clone()),
            lti_role: Set(record.lti_role.clone()),
            created_at: Set(record.created_at),
            expires_at: Set(record.expires_at),
        };
        if record.id.is_none() {
            let model = active.insert(self.db.as_ref()).await.context("insert auth code")?;
            return Ok(Some(model.id));
        }
        match active.update(self.db.as_ref()).await {
            Ok(model) => Ok(Some(model.id)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("update auth code").into()),
        }
    }

    async fn flush(&self) -> Result<(), DaoError> {
        // Statements run on the connection as they are issued; nothing is buffered.
        trace!("flush auth codes");
        Ok(())
    }
}

fn auth_code_query(filter: &AuthCodeFilter) -> Select<auth_codes::Entity> {
    let query = auth_codes::Entity::find();
    match filter {
        AuthCodeFilter::Id(id) => query.filter(auth_codes::Column::Id.eq(*id)),
        AuthCodeFilter::Code(code) => query.filter(auth_codes::Column::AuthCode.eq(code.as_str())),
        AuthCodeFilter::CodeAndUser { code, user_id } => query
            .filter(auth_codes::Column::AuthCode.eq(code.as_str()))
            .filter(auth_codes::Column::UserId.eq(user_id.as_str())),
    }
}

fn auth_code_from_model(model: auth_codes::Model) -> AuthCode {
    AuthCode {
        id: Some(model.id),
        auth_code: model.auth_code,
        user_id: model.user_id,
        sakai_role: model.sakai_role,
        lti_role: model.lti_role,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}

// ── SiteCopyJob repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSiteCopyJobRepository {
    pub db: Arc<DatabaseConnection>,
}

impl Repository<SiteCopyJob> for DbSiteCopyJobRepository {
    type Filter = SiteCopyJobFilter;

    async fn find_one(&self, filter: &SiteCopyJobFilter) -> Result<Option<SiteCopyJob>, DaoError> {
        let model = site_copy_job_query(filter)
            .order_by_asc(site_copy_jobs::Column::Id)
            .one(self.db.as_ref())
            .await
            .with_context(|| format!("find site copy job by {filter:?}"))?;
        Ok(model.map(site_copy_job_from_model))
    }

    async fn find_many(&self, filter: &SiteCopyJobFilter) -> Result<Vec<SiteCopyJob>, DaoError> {
        let models = site_copy_job_query(filter)
            .order_by_asc(site_copy_jobs::Column::Id)
            .all(self.db.as_ref())
            .await
            .with_context(|| format!("list site copy jobs by {filter:?}"))?;
        Ok(models.into_iter().map(site_copy_job_from_model).collect())
    }

    async fn upsert(&self, record: &SiteCopyJob) -> Result<Option<i64>, DaoError> {
        let active = site_copy_jobs::ActiveModel {
            id: record.id.map_or(NotSet, Set),
            batch_id: Set(record.batch_id),
            source_site_id: Set(record.source_site_id.clone()),
            target_site_id: Set(record.target_site_id.clone()),
            status: Set(record.status.clone()),
            message: Set(record.message.clone()),
            created_at: Set(record.created_at),
            updated_at: Set(record.updated_at),
        };
        if record.id.is_none() {
            let model = active
                .insert(self.db.as_ref())
                .await
                .context("insert site copy job")?;
            return Ok(Some(model.id));
        }
        match active.update(self.db.as_ref()).await {
            Ok(model) => Ok(Some(model.id)),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context("update site copy job")
                .into()),
        }
    }

    async fn flush(&self) -> Result<(), DaoError> {
        trace!("flush site copy jobs");
        Ok(())
    }
}

impl StatusTransition for DbSiteCopyJobRepository {
    async fn transition_status(&self, id: i64, from: &str, to: &str) -> Result<bool, DaoError> {
        let result = site_copy_jobs::Entity::update_many()
            .col_expr(site_copy_jobs::Column::Status, Expr::value(to))
            .col_expr(site_copy_jobs::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(site_copy_jobs::Column::Id.eq(id))
            .filter(site_copy_jobs::Column::Status.eq(from))
            .exec(self.db.as_ref())
            .await
            .context("transition site copy job status")?;
        Ok(result.rows_affected == 1)
    }
}

fn site_copy_job_query(filter: &SiteCopyJobFilter) -> Select<site_copy_jobs::Entity> {
    let query = site_copy_jobs::Entity::find();
    match filter {
        SiteCopyJobFilter::Id(id) => query.filter(site_copy_jobs::Column::Id.eq(*id)),
        SiteCopyJobFilter::Status(status) => {
            query.filter(site_copy_jobs::Column::Status.eq(status.as_str()))
        }
        SiteCopyJobFilter::Batch(batch_id) => {
            query.filter(site_copy_jobs::Column::BatchId.eq(*batch_id))
        }
    }
}

fn site_copy_job_from_model(model: site_copy_jobs::Model) -> SiteCopyJob {
    SiteCopyJob {
        id: Some(model.id),
        batch_id: model.batch_id,
        source_site_id: model.source_site_id,
        target_site_id: model.target_site_id,
        status: model.status,
        message: model.message,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

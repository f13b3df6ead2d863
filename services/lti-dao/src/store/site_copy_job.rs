use chrono::Utc;
use tracing::{debug, error, info};

use crate::domain::repository::{Repository, SiteCopyJobFilter, StatusTransition};
use crate::domain::types::{SaveOutcome, SiteCopyJob};
use crate::error::DaoError;

/// Work queue of Kaltura site copy jobs.
///
/// [`Self::check_work_queue`] only peeks: two pollers can see the same job.
/// Use [`Self::claim_next`] when a job must be dispatched once.
pub struct SiteCopyJobStore<R> {
    repo: R,
}

impl<R> SiteCopyJobStore<R>
where
    R: Repository<SiteCopyJob, Filter = SiteCopyJobFilter>,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// First job (lowest id) currently in `status`, if any.
    pub async fn check_work_queue(&self, status: &str) -> Result<Option<SiteCopyJob>, DaoError> {
        let job = self
            .repo
            .find_one(&SiteCopyJobFilter::Status(status.to_owned()))
            .await?;
        match &job {
            Some(job) => debug!(status, job_id = ?job.id, "found queued site copy job"),
            None => debug!(status, "site copy work queue is empty"),
        }
        Ok(job)
    }

    pub async fn get_site_copy_job(
        &self,
        job_id: Option<i64>,
    ) -> Result<Option<SiteCopyJob>, DaoError> {
        let job_id = require_id(job_id, "job id cannot be blank")?;
        let job = self.repo.find_one(&SiteCopyJobFilter::Id(job_id)).await?;
        match job {
            Some(_) => debug!(job_id, "found site copy job"),
            None => debug!(job_id, "no site copy job found"),
        }
        Ok(job)
    }

    /// All jobs of a batch in store order. An unknown batch yields an empty list.
    pub async fn get_all_jobs(&self, batch_id: Option<i64>) -> Result<Vec<SiteCopyJob>, DaoError> {
        let batch_id = require_id(batch_id, "batch id cannot be blank")?;
        let jobs = self
            .repo
            .find_many(&SiteCopyJobFilter::Batch(batch_id))
            .await?;
        if jobs.is_empty() {
            debug!(batch_id, "no site copy jobs found for batch");
        } else {
            debug!(batch_id, rows = jobs.len(), "found site copy jobs for batch");
        }
        Ok(jobs)
    }

    /// Insert `job` (`update == false`) or update it in place by id (`update == true`).
    ///
    /// Invalid jobs are not written. Only database failures come back as `Err`.
    pub async fn save(&self, job: &SiteCopyJob, update: bool) -> Result<SaveOutcome, DaoError> {
        if !job.is_valid() {
            error!(?job, "site copy job is not valid, not persisting");
            return Ok(SaveOutcome::ValidationFailed);
        }

        if update {
            let job_id = job
                .id
                .ok_or(DaoError::InvalidArgument("job id is required for update"))?;
            let job = SiteCopyJob {
                updated_at: Utc::now(),
                ..job.clone()
            };
            return Ok(match self.repo.upsert(&job).await? {
                Some(id) => {
                    info!(job_id = id, status = %job.status, "updated site copy job");
                    SaveOutcome::Saved(id)
                }
                None => {
                    error!(job_id, "no site copy job row to update");
                    SaveOutcome::UpdateMissed(job_id)
                }
            });
        }

        let job = SiteCopyJob {
            id: None,
            ..job.clone()
        };
        Ok(match self.repo.upsert(&job).await? {
            Some(id) => {
                info!(job_id = id, batch_id = job.batch_id, "inserted site copy job");
                SaveOutcome::Saved(id)
            }
            None => {
                error!(batch_id = job.batch_id, "insert of site copy job returned no id");
                SaveOutcome::InsertFailed
            }
        })
    }
}

impl<R> SiteCopyJobStore<R>
where
    R: Repository<SiteCopyJob, Filter = SiteCopyJobFilter> + StatusTransition,
{
    /// Move job `job_id` from `from` to `to` only if it is still in `from`.
    pub async fn transition(
        &self,
        job_id: Option<i64>,
        from: &str,
        to: &str,
    ) -> Result<bool, DaoError> {
        let job_id = require_id(job_id, "job id cannot be blank")?;
        require_transition(from, to)?;
        let applied = self.repo.transition_status(job_id, from, to).await?;
        debug!(job_id, from, to, applied, "site copy job status transition");
        Ok(applied)
    }

    /// Atomically claim the first job in `status` by moving it to `next_status`.
    ///
    /// The head of the queue is re-read after every lost race; a job taken by
    /// another poller has already left `status`, so each retry sees a new head.
    pub async fn claim_next(
        &self,
        status: &str,
        next_status: &str,
    ) -> Result<Option<SiteCopyJob>, DaoError> {
        require_transition(status, next_status)?;

        let queued = SiteCopyJobFilter::Status(status.to_owned());
        while let Some(candidate) = self.repo.find_one(&queued).await? {
            let Some(job_id) = candidate.id else {
                return Ok(None);
            };
            if !self
                .repo
                .transition_status(job_id, status, next_status)
                .await?
            {
                debug!(job_id, "site copy job already claimed");
                continue;
            }
            info!(job_id, from = status, to = next_status, "claimed site copy job");
            let claimed = self.repo.find_one(&SiteCopyJobFilter::Id(job_id)).await?;
            return Ok(claimed.or(Some(SiteCopyJob {
                status: next_status.to_owned(),
                ..candidate
            })));
        }
        Ok(None)
    }
}

fn require_id(id: Option<i64>, message: &'static str) -> Result<i64, DaoError> {
    id.filter(|id| *id > 0)
        .ok_or(DaoError::InvalidArgument(message))
}

fn require_transition(from: &str, to: &str) -> Result<(), DaoError> {
    if from.trim().is_empty() || to.trim().is_empty() {
        return Err(DaoError::InvalidArgument("status cannot be blank"));
    }
    if from == to {
        return Err(DaoError::InvalidArgument(
            "next status must differ from current status",
        ));
    }
    Ok(())
}

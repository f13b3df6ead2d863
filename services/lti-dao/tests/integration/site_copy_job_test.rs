use kaltura_testing::fixture::site_copy_job;
use lti_dao::domain::types::{
    JOB_STATUS_DONE, JOB_STATUS_IN_PROGRESS, JOB_STATUS_NEW, SaveOutcome,
};
use lti_dao::error::DaoError;

use crate::helpers::{MemJobs, job_store};

fn queue_of_three() -> MemJobs {
    MemJobs::with_rows(vec![
        site_copy_job(1, JOB_STATUS_NEW),
        site_copy_job(1, JOB_STATUS_DONE),
        site_copy_job(2, JOB_STATUS_NEW),
    ])
}

#[tokio::test]
async fn should_return_first_job_in_status() {
    let (store, _) = job_store(queue_of_three());

    let job = store.check_work_queue(JOB_STATUS_NEW).await.unwrap().unwrap();
    assert_eq!(job.id, Some(1));
    assert_eq!(job.status, JOB_STATUS_NEW);
}

#[tokio::test]
async fn should_peek_work_queue_with_single_lookup() {
    let (store, repo) = job_store(queue_of_three());

    store.check_work_queue(JOB_STATUS_NEW).await.unwrap();
    assert_eq!(repo.query_count(), 1);
}

#[tokio::test]
async fn should_return_none_for_unmatched_status() {
    let (store, _) = job_store(queue_of_three());
    assert!(store.check_work_queue("missing-status").await.unwrap().is_none());
}

#[tokio::test]
async fn should_not_claim_when_peeking_work_queue() {
    let (store, _) = job_store(queue_of_three());

    let first = store.check_work_queue(JOB_STATUS_NEW).await.unwrap();
    let second = store.check_work_queue(JOB_STATUS_NEW).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn should_reject_absent_ids_before_store_access() {
    let (store, repo) = job_store(queue_of_three());

    let job = store.get_site_copy_job(None).await;
    assert!(
        matches!(job, Err(DaoError::InvalidArgument(_))),
        "expected InvalidArgument, got {job:?}"
    );

    let jobs = store.get_all_jobs(None).await;
    assert!(
        matches!(jobs, Err(DaoError::InvalidArgument(_))),
        "expected InvalidArgument, got {jobs:?}"
    );

    assert_eq!(repo.query_count(), 0);
}

#[tokio::test]
async fn should_get_job_by_id() {
    let (store, _) = job_store(queue_of_three());

    let job = store.get_site_copy_job(Some(2)).await.unwrap().unwrap();
    assert_eq!(job.status, JOB_STATUS_DONE);

    assert!(store.get_site_copy_job(Some(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn should_list_batch_jobs_in_store_order() {
    let (store, _) = job_store(queue_of_three());

    let jobs = store.get_all_jobs(Some(1)).await.unwrap();
    let ids: Vec<_> = jobs.iter().map(|j| j.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);

    assert!(store.get_all_jobs(Some(77)).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_return_assigned_id_on_insert() {
    let (store, repo) = job_store(MemJobs::empty());

    let outcome = store
        .save(&site_copy_job(5, JOB_STATUS_NEW), false)
        .await
        .unwrap();

    assert_eq!(outcome, SaveOutcome::Saved(1));
    assert_eq!(repo.rows().len(), 1);
}

#[tokio::test]
async fn should_insert_new_row_even_when_job_carries_id() {
    let (store, repo) = job_store(queue_of_three());
    let existing = store.get_site_copy_job(Some(1)).await.unwrap().unwrap();

    let outcome = store.save(&existing, false).await.unwrap();

    assert_eq!(outcome, SaveOutcome::Saved(4));
    assert_eq!(repo.rows().len(), 4);
}

#[tokio::test]
async fn should_update_job_in_place() {
    let (store, repo) = job_store(queue_of_three());
    let mut job = store.get_site_copy_job(Some(3)).await.unwrap().unwrap();

    job.status = JOB_STATUS_DONE.to_owned();
    job.message = Some("copied 12 entries".to_owned());
    let outcome = store.save(&job, true).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Saved(3));

    let reloaded = store.get_site_copy_job(Some(3)).await.unwrap().unwrap();
    assert_eq!(reloaded.status, JOB_STATUS_DONE);
    assert_eq!(reloaded.message.as_deref(), Some("copied 12 entries"));
    assert!(reloaded.updated_at >= job.updated_at);
    assert_eq!(repo.rows().len(), 3);
}

#[tokio::test]
async fn should_not_persist_invalid_job() {
    let (store, repo) = job_store(MemJobs::empty());
    let mut job = site_copy_job(5, JOB_STATUS_NEW);
    job.source_site_id = String::new();

    let outcome = store.save(&job, false).await.unwrap();

    assert_eq!(outcome, SaveOutcome::ValidationFailed);
    assert!(repo.rows().is_empty());
}

#[tokio::test]
async fn should_report_insert_without_id() {
    let (store, repo) = job_store(MemJobs::empty());
    repo.drop_insert_ids(true);

    let outcome = store
        .save(&site_copy_job(5, JOB_STATUS_NEW), false)
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::InsertFailed);
    assert_eq!(outcome.id(), None);
}

#[tokio::test]
async fn should_report_update_of_missing_job() {
    let (store, _) = job_store(MemJobs::empty());
    let mut job = site_copy_job(5, JOB_STATUS_NEW);
    job.id = Some(9);

    let outcome = store.save(&job, true).await.unwrap();
    assert_eq!(outcome, SaveOutcome::UpdateMissed(9));
}

#[tokio::test]
async fn should_require_id_for_update() {
    let (store, _) = job_store(MemJobs::empty());

    let result = store.save(&site_copy_job(5, JOB_STATUS_NEW), true).await;
    assert!(matches!(result, Err(DaoError::InvalidArgument(_))));
}

#[tokio::test]
async fn should_surface_database_failure_on_save() {
    let (store, repo) = job_store(MemJobs::empty());
    repo.fail_writes(true);

    let result = store.save(&site_copy_job(5, JOB_STATUS_NEW), false).await;
    assert!(matches!(result, Err(DaoError::Persistence(_))));
}

#[tokio::test]
async fn should_claim_each_job_once() {
    let (store, repo) = job_store(queue_of_three());

    let first = store
        .claim_next(JOB_STATUS_NEW, JOB_STATUS_IN_PROGRESS)
        .await
        .unwrap()
        .unwrap();
    let second = store
        .claim_next(JOB_STATUS_NEW, JOB_STATUS_IN_PROGRESS)
        .await
        .unwrap()
        .unwrap();
    let third = store
        .claim_next(JOB_STATUS_NEW, JOB_STATUS_IN_PROGRESS)
        .await
        .unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(3));
    assert_eq!(first.status, JOB_STATUS_IN_PROGRESS);
    assert!(third.is_none());

    let in_progress = repo
        .rows()
        .into_iter()
        .filter(|j| j.status == JOB_STATUS_IN_PROGRESS)
        .count();
    assert_eq!(in_progress, 2);
}

#[tokio::test]
async fn should_apply_transition_only_from_expected_status() {
    let (store, _) = job_store(queue_of_three());

    assert!(
        store
            .transition(Some(1), JOB_STATUS_NEW, JOB_STATUS_IN_PROGRESS)
            .await
            .unwrap()
    );
    assert!(
        !store
            .transition(Some(1), JOB_STATUS_NEW, JOB_STATUS_IN_PROGRESS)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn should_reject_claim_to_same_status() {
    let (store, repo) = job_store(queue_of_three());

    let result = store.claim_next(JOB_STATUS_NEW, JOB_STATUS_NEW).await;
    assert!(matches!(result, Err(DaoError::InvalidArgument(_))));
    assert_eq!(repo.query_count(), 0);
}

use chrono::{Duration, Utc};

use kaltura_testing::fixture;
use lti_dao::domain::types::DEFAULT_AUTHCODE_TTL_SECS;
use lti_dao::error::DaoError;

use crate::helpers::{MemAuthCodes, auth_code_store};

#[tokio::test]
async fn should_get_auth_code_by_id() {
    let (store, _) = auth_code_store(MemAuthCodes::with_rows(vec![
        fixture::auth_code("user-1", "CODE1"),
        fixture::auth_code("user-2", "CODE2"),
    ]));

    let found = store.get_auth_code(2).await.unwrap().unwrap();
    assert_eq!(found.id, Some(2));
    assert_eq!(found.auth_code, "CODE2");

    assert!(store.get_auth_code(99).await.unwrap().is_none());
}

#[tokio::test]
async fn should_find_created_auth_code_by_code() {
    let (store, _) = auth_code_store(MemAuthCodes::empty());
    let now = Utc::now();
    let expires = now + Duration::minutes(10);

    let created = store
        .create_auth_code("user-1", "XYZ789", now, expires)
        .await
        .unwrap();
    assert!(created.id.is_some());

    let found = store.get_auth_code_by_code("XYZ789").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.auth_code, "XYZ789");
    assert_eq!(found.user_id, "user-1");
    assert_eq!(found.expires_at, expires);
}

#[tokio::test]
async fn should_flush_exactly_once_per_save() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());

    store.save(fixture::auth_code("user-1", "A1")).await.unwrap();
    assert_eq!(repo.flush_count(), 1);

    store
        .create_auth_code_from(fixture::auth_code("user-2", "B2"))
        .await
        .unwrap();
    assert_eq!(repo.flush_count(), 2);
}

#[tokio::test]
async fn should_match_composite_lookup_on_code_and_user() {
    let (store, _) = auth_code_store(MemAuthCodes::with_rows(vec![fixture::auth_code(
        "user-1", "SHARED",
    )]));

    let found = store.get_auth_code_for_user("SHARED", "user-1").await.unwrap();
    assert!(found.is_some());

    let other = store.get_auth_code_for_user("SHARED", "user-2").await.unwrap();
    assert!(other.is_none(), "code must not match another user");
}

#[tokio::test]
async fn should_rebuild_expiry_before_persisting() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    let now = Utc::now();

    let created = store
        .create_auth_code(" user-1 ", "TOKEN", now, now)
        .await
        .unwrap();

    assert_eq!(created.user_id, "user-1");
    assert_eq!(
        created.expires_at,
        now + Duration::seconds(DEFAULT_AUTHCODE_TTL_SECS)
    );
    assert_eq!(repo.rows()[0], created);
}

#[tokio::test]
async fn should_generate_token_for_blank_code() {
    let (store, _) = auth_code_store(MemAuthCodes::empty());
    let now = Utc::now();

    let created = store
        .create_auth_code("user-1", "", now, now + Duration::minutes(1))
        .await
        .unwrap();
    assert!(!created.auth_code.is_empty());

    let found = store
        .get_auth_code_by_code(&created.auth_code)
        .await
        .unwrap();
    assert_eq!(found, Some(created));
}

#[tokio::test]
async fn should_reject_blank_user_without_writing() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    let now = Utc::now();

    let result = store
        .create_auth_code("  ", "TOKEN", now, now + Duration::minutes(1))
        .await;

    assert!(
        matches!(result, Err(DaoError::InvalidArgument(_))),
        "expected InvalidArgument, got {result:?}"
    );
    assert!(repo.rows().is_empty());
    assert_eq!(repo.flush_count(), 0);
}

#[tokio::test]
async fn should_wrap_write_failure_with_context() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    repo.fail_writes(true);

    let err = store
        .create_auth_code_from(fixture::auth_code("user-1", "FAIL"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "PERSISTENCE");
    let message = err.to_string();
    assert!(message.contains("create auth code"), "{message}");
    assert!(message.contains("user-1"), "{message}");
    assert!(message.contains("simulated write failure"), "{message}");
    assert_eq!(repo.flush_count(), 0);
}

#[tokio::test]
async fn should_fail_save_when_flush_fails() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    repo.fail_flush(true);

    let err = store
        .save(fixture::auth_code("user-1", "FLUSH"))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::Persistence(_)));
    assert!(err.to_string().contains("simulated flush failure"));
}

#[tokio::test]
async fn should_fail_save_when_insert_returns_no_id() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    repo.drop_insert_ids(true);

    let err = store
        .save(fixture::auth_code("user-1", "NOID"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no auth code row written"));
}

#[tokio::test]
async fn should_update_saved_auth_code_in_place() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    let mut saved = store
        .save(fixture::auth_code("user-1", "KEEP"))
        .await
        .unwrap();

    saved.lti_role = Some("Instructor".to_owned());
    let updated = store.save(saved.clone()).await.unwrap();

    assert_eq!(updated.id, saved.id);
    assert_eq!(repo.rows().len(), 1);
    assert_eq!(repo.rows()[0].lti_role.as_deref(), Some("Instructor"));
}

#[tokio::test]
async fn should_hide_expired_auth_code_from_active_lookup() {
    let (store, _) = auth_code_store(MemAuthCodes::with_rows(vec![fixture::auth_code(
        "user-1", "SOON",
    )]));

    let now = Utc::now();
    assert!(store.get_active_auth_code("SOON", now).await.unwrap().is_some());

    let later = now + Duration::minutes(5);
    assert!(store.get_active_auth_code("SOON", later).await.unwrap().is_none());
}

#[tokio::test]
async fn should_flush_on_commit() {
    let (store, repo) = auth_code_store(MemAuthCodes::empty());
    store.commit().await.unwrap();
    assert_eq!(repo.flush_count(), 1);

    repo.fail_flush(true);
    assert!(matches!(
        store.commit().await,
        Err(DaoError::Persistence(_))
    ));
}

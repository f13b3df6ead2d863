use chrono::{Duration, Utc};

use lti_dao::domain::types::{AuthCode, SiteCopyJob};

/// A valid, unsaved auth code expiring two minutes from now.
pub fn auth_code(user_id: &str, code: &str) -> AuthCode {
    let now = Utc::now();
    AuthCode::new(user_id, code, now, now + Duration::seconds(120))
}

/// A valid, unsaved job in `status` for `batch_id`.
pub fn site_copy_job(batch_id: i64, status: &str) -> SiteCopyJob {
    SiteCopyJob {
        status: status.to_owned(),
        ..SiteCopyJob::new(
            batch_id,
            format!("source-site-{batch_id}"),
            format!("target-site-{batch_id}"),
        )
    }
}

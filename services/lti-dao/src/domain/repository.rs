#![allow(async_fn_in_trait)]

use crate::domain::types::{AuthCode, SiteCopyJob};
use crate::error::DaoError;

/// A persisted row with a store-assigned `i64` key.
pub trait Record: Clone + Send + Sync {
    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
}

impl Record for AuthCode {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Record for SiteCopyJob {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Field-equality predicate evaluated against a record.
pub trait RecordFilter<T> {
    fn matches(&self, record: &T) -> bool;
}

/// Persistence provider for one record type.
///
/// Results of `find_many` come back in store order (ascending id).
pub trait Repository<T: Record>: Send + Sync {
    type Filter: RecordFilter<T> + Send + Sync;

    async fn find_one(&self, filter: &Self::Filter) -> Result<Option<T>, DaoError>;

    async fn find_many(&self, filter: &Self::Filter) -> Result<Vec<T>, DaoError>;

    /// Insert when `record.id()` is `None`, otherwise update that row in place.
    /// Returns the written row's id, or `None` when nothing was written.
    async fn upsert(&self, record: &T) -> Result<Option<i64>, DaoError>;

    /// Push any pending writes to the backing store.
    async fn flush(&self) -> Result<(), DaoError>;
}

/// Compare-and-set on a job's status, used to claim work atomically.
pub trait StatusTransition: Send + Sync {
    /// Set `status = to` on job `id` only while its status is still `from`.
    /// Returns `true` when the row changed.
    async fn transition_status(&self, id: i64, from: &str, to: &str) -> Result<bool, DaoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCodeFilter {
    Id(i64),
    Code(String),
    CodeAndUser { code: String, user_id: String },
}

impl RecordFilter<AuthCode> for AuthCodeFilter {
    fn matches(&self, record: &AuthCode) -> bool {
        match self {
            Self::Id(id) => record.id == Some(*id),
            Self::Code(code) => record.auth_code == *code,
            Self::CodeAndUser { code, user_id } => {
                record.auth_code == *code && record.user_id == *user_id
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteCopyJobFilter {
    Id(i64),
    Status(String),
    Batch(i64),
}

impl RecordFilter<SiteCopyJob> for SiteCopyJobFilter {
    fn matches(&self, record: &SiteCopyJob) -> bool {
        match self {
            Self::Id(id) => record.id == Some(*id),
            Self::Status(status) => record.status == *status,
            Self::Batch(batch_id) => record.batch_id == *batch_id,
        }
    }
}

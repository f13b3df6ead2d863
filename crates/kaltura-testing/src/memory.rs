use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use lti_dao::domain::repository::{
    Record, RecordFilter, Repository, SiteCopyJobFilter, StatusTransition,
};
use lti_dao::domain::types::SiteCopyJob;
use lti_dao::error::DaoError;

/// In-memory stand-in for a database table.
///
/// Clones share the same rows and counters, so a test can hand one clone to a
/// store and inspect the other afterwards.
pub struct InMemoryRepository<T, F> {
    rows: Arc<Mutex<Vec<T>>>,
    next_id: Arc<AtomicI64>,
    queries: Arc<AtomicUsize>,
    flushes: Arc<AtomicUsize>,
    fail_writes: Arc<AtomicBool>,
    fail_flush: Arc<AtomicBool>,
    drop_insert_ids: Arc<AtomicBool>,
    _filter: PhantomData<fn() -> F>,
}

impl<T, F> Clone for InMemoryRepository<T, F> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            next_id: Arc::clone(&self.next_id),
            queries: Arc::clone(&self.queries),
            flushes: Arc::clone(&self.flushes),
            fail_writes: Arc::clone(&self.fail_writes),
            fail_flush: Arc::clone(&self.fail_flush),
            drop_insert_ids: Arc::clone(&self.drop_insert_ids),
            _filter: PhantomData,
        }
    }
}

impl<T: Record, F> InMemoryRepository<T, F> {
    pub fn empty() -> Self {
        Self {
            rows: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(AtomicI64::new(1)),
            queries: Arc::new(AtomicUsize::new(0)),
            flushes: Arc::new(AtomicUsize::new(0)),
            fail_writes: Arc::new(AtomicBool::new(false)),
            fail_flush: Arc::new(AtomicBool::new(false)),
            drop_insert_ids: Arc::new(AtomicBool::new(false)),
            _filter: PhantomData,
        }
    }

    /// Seed rows in order. Rows without an id get the next free one.
    pub fn with_rows(rows: Vec<T>) -> Self {
        let repo = Self::empty();
        {
            let mut stored = repo.rows.lock().unwrap();
            for mut row in rows {
                match row.id() {
                    Some(id) => {
                        repo.next_id.fetch_max(id + 1, Ordering::SeqCst);
                    }
                    None => row.set_id(repo.next_id.fetch_add(1, Ordering::SeqCst)),
                }
                stored.push(row);
            }
        }
        repo
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of `find_one`/`find_many` calls served.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    /// Make every `upsert` fail with a persistence error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_flush(&self, fail: bool) {
        self.fail_flush.store(fail, Ordering::SeqCst);
    }

    /// Make inserts succeed without reporting an id, like a driver that returns no key.
    pub fn drop_insert_ids(&self, drop: bool) {
        self.drop_insert_ids.store(drop, Ordering::SeqCst);
    }
}

impl<T, F> Repository<T> for InMemoryRepository<T, F>
where
    T: Record,
    F: RecordFilter<T> + Send + Sync,
{
    type Filter = F;

    async fn find_one(&self, filter: &F) -> Result<Option<T>, DaoError> {
        Ok(self.find_many(filter).await?.into_iter().next())
    }

    async fn find_many(&self, filter: &F) -> Result<Vec<T>, DaoError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut found: Vec<T> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id());
        Ok(found)
    }

    async fn upsert(&self, record: &T) -> Result<Option<i64>, DaoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated write failure").into());
        }
        let mut rows = self.rows.lock().unwrap();
        match record.id() {
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let mut row = record.clone();
                row.set_id(id);
                rows.push(row);
                if self.drop_insert_ids.load(Ordering::SeqCst) {
                    return Ok(None);
                }
                Ok(Some(id))
            }
            Some(id) => match rows.iter_mut().find(|r| r.id() == Some(id)) {
                Some(row) => {
                    *row = record.clone();
                    Ok(Some(id))
                }
                None => Ok(None),
            },
        }
    }

    async fn flush(&self) -> Result<(), DaoError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated flush failure").into());
        }
        Ok(())
    }
}

impl StatusTransition for InMemoryRepository<SiteCopyJob, SiteCopyJobFilter> {
    async fn transition_status(&self, id: i64, from: &str, to: &str) -> Result<bool, DaoError> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|job| job.id == Some(id) && job.status == from)
        {
            Some(job) => {
                job.status = to.to_owned();
                job.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

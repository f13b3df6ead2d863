use lti_dao::domain::repository::{AuthCodeFilter, SiteCopyJobFilter};
use lti_dao::domain::types::{AuthCode, SiteCopyJob};
use lti_dao::store::{AuthCodeStore, SiteCopyJobStore};

use kaltura_testing::InMemoryRepository;

pub type MemAuthCodes = InMemoryRepository<AuthCode, AuthCodeFilter>;
pub type MemJobs = InMemoryRepository<SiteCopyJob, SiteCopyJobFilter>;

/// Store over `repo` plus a shared handle for inspecting it afterwards.
pub fn auth_code_store(repo: MemAuthCodes) -> (AuthCodeStore<MemAuthCodes>, MemAuthCodes) {
    let handle = repo.clone();
    (AuthCodeStore::new(repo), handle)
}

pub fn job_store(repo: MemJobs) -> (SiteCopyJobStore<MemJobs>, MemJobs) {
    let handle = repo.clone();
    (SiteCopyJobStore::new(repo), handle)
}

pub mod auth_code;
pub mod site_copy_job;

pub use auth_code::AuthCodeStore;
pub use site_copy_job::SiteCopyJobStore;

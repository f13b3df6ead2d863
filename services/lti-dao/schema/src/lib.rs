pub mod auth_codes;
pub mod site_copy_jobs;

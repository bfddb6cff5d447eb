pub mod actor;
pub mod audit_log;
pub mod church;
pub mod interest;
pub mod job_listing;
pub mod profile;

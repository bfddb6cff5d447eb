pub mod audit_service;
pub mod interest_service;
pub mod lifecycle_service;
pub mod matching_service;
pub mod visibility;

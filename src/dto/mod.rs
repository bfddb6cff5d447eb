pub mod job_listing_dto;
pub mod matching_dto;
pub mod profile_dto;

pub mod auth;
pub mod job_listings;
pub mod organizations;

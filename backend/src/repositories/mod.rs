pub mod job_listing;
pub mod organization;
pub mod permissions;
pub mod session;
pub mod transaction;
pub mod user;

pub use permissions::PermissionRow;
pub use transaction::*;

pub mod permissions;
pub mod session;

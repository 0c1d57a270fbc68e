pub mod cookies;
pub mod id_codec;
pub mod password;
pub mod session_token;

pub use password::*;

pub mod id;
pub mod snowflake;

pub use id::*;
pub use snowflake::{SnowflakeGenerator, DEFAULT_EPOCH_MS};

//! # Utilities Library
//!
//! Shared utility functions for environment variables, time, validation and guest names.

pub mod envs;
pub mod names;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_or, get_env_parse, get_env_parse_or};
pub use names::guest_name;
pub use time::{now_utc, unix_millis};
pub use validation::{validate_not_empty, validate_max_length};

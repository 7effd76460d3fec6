//! Configuration loading and validation for the timer and audio runtime.

mod loader;
mod types;
mod validator;

pub use loader::ConfigLoader;
pub use types::*;
pub use validator::ConfigValidator;

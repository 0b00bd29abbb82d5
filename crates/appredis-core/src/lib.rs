//! # appredis-core
//!
//! Core crate for appredis. Contains the host [`Application`] with its
//! extension table, the flat [`Settings`] map extensions read their
//! configuration from, and the unified error system.
//!
//! This crate has **no** dependency on the Redis client.

pub mod app;
pub mod config;
pub mod error;
pub mod extensions;
pub mod result;

pub use app::Application;
pub use config::Settings;
pub use error::AppError;
pub use extensions::Extensions;
pub use result::AppResult;

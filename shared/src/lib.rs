//! Hackathon Platform Shared Library
//!
//! This crate contains the API types, the Telegram user model and the
//! input validation helpers shared by the backend and its clients.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::{Theme, WebAppUser};
pub use types::*;

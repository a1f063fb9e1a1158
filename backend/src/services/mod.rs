//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the authentication primitives.

pub mod telegram_auth;
pub mod user;

pub use telegram_auth::TelegramAuthService;
pub use user::{UpsertOutcome, UserService};

//! Authentication module
//!
//! Telegram init-data verification plus the JWT sessions issued after a
//! successful login.

mod init_data;
mod jwt;
mod middleware;
mod telegram;

pub use init_data::{data_check_string, encode_query, LoginPayload, SIGNATURE_FIELD};
pub use jwt::{Claims, JwtService, TokenType};
pub use middleware::AuthUser;
pub use telegram::{
    InitDataError, InitDataScheme, InitDataVerifier, VerifiedIdentity, DEFAULT_CLOCK_SKEW_SECS,
    DEFAULT_MAX_AGE_SECS,
};

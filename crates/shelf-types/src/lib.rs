#![allow(non_snake_case)]

pub mod auth;
pub mod book;
pub mod query;
pub mod theme;

pub use auth::*;
pub use book::*;
pub use query::*;
pub use theme::*;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_token";

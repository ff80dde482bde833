//! Credentials, tokens, and request guards for the gym backend.
//!
//! Argon2 password hashing, JWT issuance and verification, and per-route
//! authentication/authorization guards for actix-web.
//!
//! ## Flow
//!
//! 1. [`Authenticator`] looks up a [`Member`] by email and checks the
//!    candidate password with the [`Hasher`].
//! 2. On a match, [`Crypto`] signs [`Claims`] into an access token.
//! 3. Later requests carry `Authorization: Bearer <token>`. A [`Guarded`]
//!    chain on the route verifies it ([`Authenticate`]), attaches the claims,
//!    and optionally enforces roles ([`Authorize`]).
//!
//! Every expected failure is a [`Failure`] value; nothing here panics on
//! bad input.
mod authenticate;
mod claims;
mod config;
mod crypto;
mod dto;
mod failure;
mod member;
mod password;
mod repository;

pub use authenticate::*;
pub use claims::*;
pub use config::*;
pub use crypto::*;
pub use dto::*;
pub use failure::*;
pub use member::*;
pub use password::*;
pub use repository::*;

#[cfg(feature = "database")]
mod postgres;
#[cfg(feature = "database")]
pub use postgres::*;

#[cfg(feature = "server")]
mod guard;
#[cfg(feature = "server")]
mod handlers;
#[cfg(feature = "server")]
mod middleware;
#[cfg(feature = "server")]
pub use guard::*;
#[cfg(feature = "server")]
pub use handlers::*;
#[cfg(feature = "server")]
pub use middleware::*;

//! # Authentication Module
//!
//! Access tokens for the catalog backend.
//!
//! ## Overview
//!
//! Every catalog call needs a bearer token. The host supplies a
//! [`TokenSource`] that knows how to obtain one (anonymous sign-in, a session
//! exchange, ...); [`TokenManager`] keeps the current token, refreshes it
//! shortly before it expires, and makes concurrent callers share a single
//! refresh. Repositories depend only on the [`TokenProvider`] seam.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::{TokenManager, TokenProvider, TokenSource};
pub use types::AccessToken;

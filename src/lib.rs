#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

//! Pluggable per-request authentication strategies for a servlet-style HTTP
//! pipeline.
//!
//! A host resolves one [`Authenticator`] per protected resource set at startup
//! (see [`configuration::AuthMethod`]) and calls
//! [`Authenticator::authenticate`] before dispatching a request. Credential
//! verification is delegated to a [`security::Realm`] obtained from the
//! [`security::AuthenticationManager`].

pub mod authenticator;
pub mod configuration;
mod error;
pub mod http;
pub mod keys;
pub mod login_page;
pub mod secret;
pub mod security;

pub use authenticator::{
    Authentication, Authenticator, BearerAuthenticator, Credentials, FormAuthenticator,
    SingleSignOnAuthenticator,
};
pub use error::Error;

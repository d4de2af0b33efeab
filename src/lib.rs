//! # Paragon Broker Library
//!
//! Stateless OAuth2 credential broker and API proxy for the SBHS student API.
//! The caller holds the session: every response carries the token it must
//! send back on the next request.
//!
//! Modules:
//! - `token`: Token entity and its JSON codec
//! - `sources`: upstream token endpoint (grants) and resource API
//! - `broker`: per-request orchestration: decode, refresh, fetch, re-encode
//! - `server`: axum HTTP entry point
//! - `config`: YAML service configuration and credential lookup

pub mod broker;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod server;
pub mod sources;
pub mod token;
pub mod utils;
#[cfg(test)]
pub mod tests;

pub use crate::broker::{Broker, ResourceResponse};
pub use crate::config::service::ServiceConfig;
pub use crate::token::Token;

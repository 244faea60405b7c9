//! Multi-tenant task tracking API.
//!
//! Tasks form arbitrarily deep parent/child hierarchies stored as a
//! closure table; every mutating operation is gated by an ownership
//! check, and authentication uses bearer tokens with a sliding refresh
//! window.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod guard;
pub mod query;
pub mod server;
pub mod types;
pub mod validate;

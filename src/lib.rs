//! Client SDK for the recipe-sharing platform's REST API.
//!
//! The heart of the crate is the session mediator
//! ([`session::SessionManager`]): it owns the access/refresh token pair,
//! decides locally when the access token is stale, coalesces concurrent
//! refresh attempts into a single network call, and exposes the valid-token
//! accessor every authenticated request goes through. Around it sit typed
//! endpoint groups (recipes, profiles, notifications, chat assistant,
//! account) and a pluggable credential store used to restore sessions
//! across restarts.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod utils;

pub use client::Client;
pub use error::{Error, Result};

//! Typed HTTP client for the JobHub API.
//!
//! This crate is the data layer of the client tier. A session's credential
//! lives on the [`ApiClient`] value it came from — authorizing yields a new
//! client carrying the token, so nothing process-global holds auth state.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use types::*;

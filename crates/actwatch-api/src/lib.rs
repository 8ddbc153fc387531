//! actwatch-api: remote platform IO boundary.
//! Status queries, bulk activity listing, and log resource access behind the
//! mock-injectable [`ActivityApi`] trait, with a reqwest-backed implementation.

pub mod client;
pub mod error;
pub mod http;

pub use client::{ActivityApi, LogByteStream};
pub use error::ApiError;
pub use http::{ApiConfig, HttpActivityApi};

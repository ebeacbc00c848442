//! Core services for the acara event manager client.
//!
//! This crate holds everything below the presentation layer:
//! - `event` and `wire` for the internal model and the webhook wire format
//! - `storage` for the persistent key-value blobs
//! - `cache` for the validity-windowed event cache and optimistic submits
//! - `gateway` for the HTTP boundary to the webhooks
//! - `store` for the in-memory collection with derived list views
//! - `auth` for the OTP challenge flow and the time-boxed session

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod storage;
pub mod store;
pub mod wire;

pub use error::{AcaraError, AcaraResult};
pub use event::{Dresscode, Event};

//! Backend transport module

pub mod client;

pub use client::{BackendClient, BackendError, DEFAULT_BASE_URL};

//! # projadm-remote
//!
//! HTTP implementation of [`projadm_core::ConfigService`] for the indexer
//! webapp's REST API (`<uri>/api/v1/...`).

pub mod client;

pub use client::HttpConfigService;

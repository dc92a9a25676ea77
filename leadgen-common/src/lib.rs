//! # Leadgen Common Library
//!
//! Shared code for the leadgen services including:
//! - Entry envelope and tagging of inbound callback records
//! - API response types for the webhook receiver
//! - Search query model, validation and outbound payload formatting
//! - Discord webhook delivery (feature `http`)
//! - Configuration loading
//! - Sample lead data

pub mod api;
pub mod config;
#[cfg(feature = "http")]
pub mod discord;
pub mod entry;
pub mod error;
pub mod samples;
pub mod search;
pub mod time;

pub use entry::{tag_payload, Entry};
pub use error::{Error, Result};

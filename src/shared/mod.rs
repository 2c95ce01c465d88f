//! Shared infrastructure: configuration and temp-resource handling.

pub mod config;
pub mod temp;

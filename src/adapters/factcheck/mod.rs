//! Fact-check adapters: response decoding and the Vera HTTP gateway.

pub mod decoder;
pub mod vera_adapter;

pub use vera_adapter::VeraAdapter;

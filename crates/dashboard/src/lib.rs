//! `mfw-dashboard` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod app;
pub mod command;
pub mod config;
pub mod submit;
pub mod view;

//! # Settlement server
//! This crate hosts the HTTP surface of the settlement engine. It is responsible for:
//! * Listening for payment webhook notifications from the provider and handing them to the reconciler.
//! * Accepting checkout requests, pricing them server-side and creating orders.
//! * Rendering Pix payloads and serving the public order view.
//! * The staff endpoint for moving orders through the lifecycle.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;

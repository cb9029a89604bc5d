//! Core module: configuration, server state, HTTP server and errors.
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - shared service handles for handlers and tasks
//! - [`Server`] - HTTP server bootstrap
//! - [`CoreError`] - service-layer error type

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use server::Server;
pub use state::ServerState;

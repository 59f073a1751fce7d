//! # Taskflow API Server Library
//!
//! This library provides the core functionality for the Taskflow API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and the token auth layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `server`: Server loop with bounded graceful shutdown

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;

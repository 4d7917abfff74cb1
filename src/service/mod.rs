//! HTTP service for the timer registry
//!
//! This module exposes the timer lifecycle controller over a small REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │          Timer API Server           │
//! │                                     │
//! │  ┌──────────────────────────────┐  │
//! │  │        REST API              │  │
//! │  │  POST /timers                │  │
//! │  │  GET  /timers                │  │
//! │  │  PUT  /timers/{id}           │  │
//! │  │  GET  /health                │  │
//! │  │  GET  /metrics               │  │
//! │  └──────────────────────────────┘  │
//! │                 │                   │
//! │  ┌──────────────────────────────┐  │
//! │  │      TimerController         │  │
//! │  └──────────────────────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use timerstore::service::{ServerConfig, TimerServer};
//!
//! let server = TimerServer::new(ServerConfig::default(), controller)?;
//! server.start().await?;
//! ```

pub mod api;
pub mod config;
pub mod server;

// Re-export main types
pub use api::create_router;
pub use config::ServerConfig;
pub use server::{AppState, ServerError, TimerServer};

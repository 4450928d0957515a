//! RentIt - peer-to-peer rental marketplace backend.
//!
//! The engineering weight sits in the booking kernel: admission of new
//! bookings under concurrent load with a hard no-overlap guarantee,
//! a table-driven lifecycle state machine with a 48-hour approval
//! window, availability projection, review ingestion with denormalized
//! rating maintenance, and canonical per-pair conversations.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and logic
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, transactions)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Expire stale pending bookings (cron entry point)
//! cargo run -- expire-bookings --dry-run --hours 48
//!
//! # Seed categories from CSV
//! cargo run -- seed-categories categories.csv --update
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};

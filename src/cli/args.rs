//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// RentIt - peer-to-peer rental marketplace backend
#[derive(Parser, Debug)]
#[command(name = "rentit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Cancel pending bookings older than the approval window
    ExpireBookings(ExpireArgs),

    /// Import categories from a CSV file (name, slug, parent_slug, icon)
    SeedCategories(SeedArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the expire-bookings command
#[derive(Parser, Debug)]
pub struct ExpireArgs {
    /// Show which bookings would be expired without modifying data
    #[arg(long)]
    pub dry_run: bool,

    /// Hours after which a pending booking expires
    #[arg(long, default_value_t = 48)]
    pub hours: i64,
}

/// Arguments for the seed-categories command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Path to the CSV file to import
    pub file: std::path::PathBuf,

    /// Validate the CSV without inserting into the database
    #[arg(long)]
    pub dry_run: bool,

    /// Update existing categories matched by slug instead of skipping
    #[arg(long)]
    pub update: bool,
}

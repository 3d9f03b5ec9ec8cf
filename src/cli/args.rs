//! Command line for the `storefront` binary.

use clap::{Args, Parser, Subcommand};

/// Retail storefront backend: catalog, carts, orders and coupons
#[derive(Parser, Debug)]
#[command(name = "storefront", author, version, about)]
pub struct Cli {
    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Manage the database schema
    Migrate(MigrateArgs),
    /// Run or inspect the notification queues
    Jobs(JobsArgs),
}

/// Overrides for the listen address; settings apply when omitted.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    /// Apply pending migrations
    Up,
    /// Revert the latest migration
    Down,
    /// List migrations and whether each is applied
    Status,
    /// Drop everything and migrate from scratch (refused in production)
    Fresh,
}

#[derive(Args, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub action: JobsAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobsAction {
    /// Deliver queued email and SMS until interrupted
    Work,
    /// Count queued notifications by status
    List,
    /// Remove notifications that failed delivery
    Clear,
}

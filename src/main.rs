mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use planner_core::{Permission, PlannerConfig, ShareLevel, Store};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planner")]
#[command(about = "Administer a planner data directory: users, calendars and sharing")]
struct Cli {
    /// Data directory to operate on (defaults to data_dir from config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show config and data paths
    Config,
    /// List users and calendars
    List,
    /// Create a user with its default calendar
    AddUser {
        username: String,

        /// Password hash stored verbatim in the login record
        #[arg(long)]
        password_hash: String,
    },
    /// Delete a user, its login and every calendar it owns
    DeleteUser { username: String },
    /// Print a user record as JSON
    ShowUser { username: String },
    /// Create a calendar owned by an existing user
    AddCalendar { owner: String, name: String },
    /// Delete a calendar and unlink everyone it is shared with
    DeleteCalendar {
        /// Calendar id (owner/name)
        calendar: String,
    },
    /// Print a calendar record as JSON
    ShowCalendar {
        /// Calendar id (owner/name)
        calendar: String,
    },
    /// Share a calendar with a user (view, edit or none)
    Share {
        /// Calendar id (owner/name)
        calendar: String,
        username: String,
        level: ShareLevel,
    },
    /// Link a user to a calendar at a raw permission level
    Associate {
        username: String,
        /// Calendar id (owner/name)
        calendar: String,
        permission: Permission,
    },
    /// Remove a user's link to a calendar
    Disassociate {
        username: String,
        /// Calendar id (owner/name)
        calendar: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config = cli.command {
        return commands::config::run(cli.data_dir.as_deref());
    }

    let store = open_store(cli.data_dir)?;

    match cli.command {
        Commands::Config => Ok(()),
        Commands::List => commands::list::run(&store),
        Commands::AddUser {
            username,
            password_hash,
        } => commands::users::add(&store, &username, &password_hash),
        Commands::DeleteUser { username } => commands::users::delete(&store, &username),
        Commands::ShowUser { username } => commands::users::show(&store, &username),
        Commands::AddCalendar { owner, name } => commands::calendars::add(&store, &owner, &name),
        Commands::DeleteCalendar { calendar } => commands::calendars::delete(&store, &calendar),
        Commands::ShowCalendar { calendar } => commands::calendars::show(&store, &calendar),
        Commands::Share {
            calendar,
            username,
            level,
        } => commands::sharing::share(&store, &calendar, &username, level),
        Commands::Associate {
            username,
            calendar,
            permission,
        } => commands::sharing::associate(&store, &username, &calendar, permission),
        Commands::Disassociate { username, calendar } => {
            commands::sharing::disassociate(&store, &username, &calendar)
        }
    }
}

fn open_store(data_dir: Option<PathBuf>) -> Result<Store> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => PlannerConfig::load()?.data_path(),
    };

    debug!(data_dir = %data_dir.display(), "opening store");
    Store::open_exclusive(&data_dir)
        .with_context(|| format!("Failed to load store from {}", data_dir.display()))
}

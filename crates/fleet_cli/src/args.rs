use clap::{Parser, Subcommand};
use fleet_core::{BackendKind, EntityId, EntityKind, FieldMap};
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Manage the driver, route and shipment registry",
    long_about = "Reads and edits drivers, routes and shipments stored as JSON, YAML or SQLite."
)]
pub struct Cli {
    #[arg(
        short = 'e',
        long,
        env = "FLEET_ENTITY",
        default_value = "drivers",
        value_name = "KIND",
        help = "Entity collection: drivers|routes|shipments"
    )]
    pub entity: EntityKind,

    #[arg(
        short = 'b',
        long,
        env = "FLEET_BACKEND",
        default_value = "json",
        value_name = "BACKEND",
        help = "Storage backend: json|yaml|sqlite"
    )]
    pub backend: BackendKind,

    #[arg(
        short = 's',
        long,
        env = "FLEET_STORE",
        value_name = "PATH",
        help = "Store file; defaults to <entity>.json, <entity>.yaml or fleet.sqlite3"
    )]
    pub store: Option<PathBuf>,

    #[arg(
        long = "log-level",
        env = "FLEET_LOG_LEVEL",
        value_name = "LEVEL",
        help = "Log level; debug in debug builds, info otherwise"
    )]
    pub log_level: Option<String>,

    #[arg(
        long = "log-dir",
        env = "FLEET_LOG_DIR",
        value_name = "DIR",
        help = "Absolute directory for rolling log files; logging is off when unset"
    )]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    #[command(about = "Print one page of records")]
    List {
        #[arg(long, default_value_t = 20, value_name = "N")]
        page_size: usize,
        #[arg(long, default_value_t = 1, value_name = "N", help = "1-based page number")]
        page: usize,
    },
    #[command(about = "Print every field of one record")]
    Show { id: EntityId },
    #[command(about = "Create a record from KEY=VALUE pairs")]
    Add {
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },
    #[command(about = "Change fields of an existing record")]
    Edit {
        id: EntityId,
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },
    #[command(about = "Remove a record")]
    Delete { id: EntityId },
    #[command(about = "Reorder the collection by a field")]
    Sort { field: String },
    #[command(about = "Print the number of records")]
    Count,
    #[command(about = "List the field names of the selected entity")]
    Fields,
}

/// Loads `.env` (or `$DOTENV_PATH`) before parsing so env fallbacks see it.
pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or_else(|_| ".env".into());
    dotenvy::from_filename(&dotenv_path).ok();
    Cli::parse()
}

pub fn field_map(assignments: &[(String, String)]) -> FieldMap {
    assignments.iter().cloned().collect()
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use statedb::{CountMode, StateDbConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "statedb",
    about = "Existence-checked key/value state in a document store",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Configuration file (statedb.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// redb file holding the state. Without one the state lives in memory
    /// for the duration of the command.
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Database (namespace) name.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Collection name.
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Count records exactly instead of using the estimate.
    #[arg(long, global = true)]
    exact_count: bool,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print whether a key exists
    Exists { key: String },
    /// Print whether a key exists and holds a non-null value
    IsSet { key: String },
    /// Add a new key; fails if it already exists.
    ///
    /// VALUE is parsed as JSON, falling back to a plain string.
    Create {
        key: String,
        value: String,
        /// Parse VALUE as an RFC 3339 timestamp.
        #[arg(long)]
        timestamp: bool,
    },
    /// Print the value of a key
    Get { key: String },
    /// Overwrite the value of an existing key
    Set {
        key: String,
        value: String,
        /// Parse VALUE as an RFC 3339 timestamp.
        #[arg(long)]
        timestamp: bool,
    },
    /// Remove an existing key
    Delete { key: String },
    /// Remove every key
    DeleteAll,
    /// Set an existing key's value to null
    Clear { key: String },
    /// Set every key's value to null
    ClearAll,
    /// Print the number of keys
    Count,
    /// Print every key and value as a JSON object
    List,
    /// Walk through create, get, set, delete and delete-all
    Demo,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "statedb=debug" } else { "statedb=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_directive.parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => StateDbConfig::from_file(path)?,
        None => StateDbConfig::default(),
    };
    if let Some(path) = cli.path {
        config.store.path = Some(path);
    }
    if let Some(database) = cli.database {
        config.store.database = database;
    }
    if let Some(collection) = cli.collection {
        config.store.collection = collection;
    }
    if cli.exact_count {
        config.options.count = CountMode::Exact;
    }

    let state = config.open()?;

    match cli.command {
        Commands::Exists { key } => commands::state::exists(&state, &key),
        Commands::IsSet { key } => commands::state::is_set(&state, &key),
        Commands::Create { key, value, timestamp } => {
            commands::state::create(&state, &key, &value, timestamp)
        }
        Commands::Get { key } => commands::state::get(&state, &key),
        Commands::Set { key, value, timestamp } => {
            commands::state::set(&state, &key, &value, timestamp)
        }
        Commands::Delete { key } => commands::state::delete(&state, &key),
        Commands::DeleteAll => commands::state::delete_all(&state),
        Commands::Clear { key } => commands::state::clear(&state, &key),
        Commands::ClearAll => commands::state::clear_all(&state),
        Commands::Count => commands::state::count(&state),
        Commands::List => commands::state::list(&state),
        Commands::Demo => commands::demo::run(&state),
    }
}

//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{Backend, validate_database_config, validate_server_config};
use crate::domain::error::TrackerError;
use crate::domain::filter::{FilterParameter, SortOrder};
use crate::ports::clock_port::SystemClock;
use crate::ports::config_port::ConfigPort;
use crate::service::{InvestmentService, SharedStore};

#[derive(Parser, Debug)]
#[command(name = "invtracker", about = "Personal investment record-keeper")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Create the investments table if it does not exist
    InitDb {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List investments purchased in a date range, as JSON
    List {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Filter, sort and page investments, as JSON
    Search {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value = "")]
        sort_field: String,
        #[arg(long)]
        descending: bool,
        #[arg(long)]
        filter_column: Option<String>,
        #[arg(long)]
        filter_value: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long, default_value_t = crate::domain::filter::DEFAULT_PAGE_SIZE)]
        page_size: i64,
    },
    /// Print distribution by type and status, or monthly totals with --year
    Summary {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Add every row of a CSV file as a new investment
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Write investments purchased in a date range to a CSV file
    Export {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        file: PathBuf,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

impl Command {
    fn config_path(&self) -> &Path {
        match self {
            Command::Serve { config }
            | Command::InitDb { config }
            | Command::List { config, .. }
            | Command::Search { config, .. }
            | Command::Summary { config, .. }
            | Command::Import { config, .. }
            | Command::Export { config, .. } => config,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match load_config(cli.command.config_path()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    init_tracing(&config);

    match execute(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_client_error() {
                tracing::warn!(error = %e, "command rejected");
            } else {
                tracing::error!(error = %e, "command failed");
            }
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Runs one command against an already loaded configuration.
pub fn execute(command: Command, config: &dyn ConfigPort) -> Result<(), TrackerError> {
    match command {
        Command::Serve { .. } => run_serve(config),
        Command::InitDb { .. } => {
            open_store(config, true)?;
            tracing::info!("schema initialized");
            Ok(())
        }
        Command::List { from, to, .. } => {
            let service = build_service(config)?;
            print_json(&service.list(from, to)?)
        }
        Command::Search {
            from,
            to,
            sort_field,
            descending,
            filter_column,
            filter_value,
            page,
            page_size,
            ..
        } => {
            let params = FilterParameter {
                sort_field,
                sort_order: if descending {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                },
                filter_column,
                filter_value,
                page_number: page,
                page_size,
            };
            let service = build_service(config)?;
            print_json(&service.search(&params, from, to)?)
        }
        Command::Summary { from, to, year, .. } => {
            let service = build_service(config)?;
            match year {
                Some(_) => print_json(&service.monthly(year)?),
                None => print_json(&service.summary(from, to)?),
            }
        }
        Command::Import { file, .. } => {
            let drafts = CsvAdapter::new(file).import()?;
            let service = build_service(config)?;
            let count = drafts.len();
            for draft in drafts {
                service.add(draft)?;
            }
            eprintln!("imported {count} investments");
            Ok(())
        }
        Command::Export { file, from, to, .. } => {
            let service = build_service(config)?;
            let investments = service.list(from, to)?;
            CsvAdapter::new(file).export(&investments)?;
            eprintln!("exported {} investments", investments.len());
            Ok(())
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, TrackerError> {
    FileConfigAdapter::from_file(path).map_err(|e| TrackerError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber. `RUST_LOG` overrides `[log] level`.
pub fn init_tracing(config: &dyn ConfigPort) {
    let level = config.get_string_or("log", "level", "info");
    let format = config.get_string_or("log", "format", "text");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    // A subscriber may already be installed when commands run in-process.
    let _ = if format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
}

/// Opens the configured store, creating the schema when `migrate` is set.
pub fn open_store(config: &dyn ConfigPort, migrate: bool) -> Result<SharedStore, TrackerError> {
    match validate_database_config(config)? {
        Backend::Sqlite => open_sqlite(config, migrate),
        Backend::Postgres => open_postgres(config, migrate),
    }
}

pub fn build_service(config: &dyn ConfigPort) -> Result<InvestmentService, TrackerError> {
    let migrate = config.get_bool("database", "auto_migrate", true);
    let store = open_store(config, migrate)?;
    Ok(InvestmentService::new(store, Arc::new(SystemClock)))
}

#[cfg(feature = "sqlite")]
fn open_sqlite(config: &dyn ConfigPort, migrate: bool) -> Result<SharedStore, TrackerError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let adapter = SqliteAdapter::from_config(config)?;
    if migrate {
        adapter.initialize_schema()?;
    }
    Ok(Arc::new(adapter))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_config: &dyn ConfigPort, _migrate: bool) -> Result<SharedStore, TrackerError> {
    Err(backend_disabled("sqlite"))
}

#[cfg(feature = "postgres")]
fn open_postgres(config: &dyn ConfigPort, migrate: bool) -> Result<SharedStore, TrackerError> {
    use crate::adapters::postgres_adapter::PostgresAdapter;

    let adapter = PostgresAdapter::from_config(config)?;
    if migrate {
        adapter.initialize_schema()?;
    }
    Ok(Arc::new(adapter))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_config: &dyn ConfigPort, _migrate: bool) -> Result<SharedStore, TrackerError> {
    Err(backend_disabled("postgres"))
}

#[allow(dead_code)]
fn backend_disabled(name: &str) -> TrackerError {
    TrackerError::ConfigInvalid {
        section: "database".into(),
        key: "backend".into(),
        reason: format!("{name} feature is not enabled in this build"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), TrackerError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| TrackerError::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

fn run_serve(config: &dyn ConfigPort) -> Result<(), TrackerError> {
    #[cfg(any(feature = "web-sqlite", feature = "web-postgres"))]
    {
        use crate::adapters::web::{AppState, build_router};

        let addr = validate_server_config(config)?;
        let service = build_service(config)?;
        let router = build_router(AppState { service });

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("shutting down");
                })
                .await
        })?;

        Ok(())
    }

    #[cfg(not(any(feature = "web-sqlite", feature = "web-postgres")))]
    {
        validate_server_config(config)?;
        Err(TrackerError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: "web feature is required for serve".into(),
        })
    }
}

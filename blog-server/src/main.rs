use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::repositories::memory::post_repository::InMemoryPostRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use infrastructure::database::{
    close_pool, create_pool, execute_script, is_local_host, list_tables, run_migrations,
    server_version,
};
use infrastructure::logging::init_logging;
use infrastructure::settings::{Settings, StorageBackend};
use presentation::AppState;

#[derive(Debug, Parser)]
#[command(name = "blog-server", version, about = "REST API for blog posts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Connect to the database and print the server version.
    CheckDb,
    /// List tables in the public schema.
    ListTables,
    /// Execute a SQL script against the database.
    RunSql {
        /// Path to the .sql file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.app_env)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::CheckDb => check_db(&settings).await,
        Command::ListTables => print_tables(&settings).await,
        Command::RunSql { file } => run_sql(&settings, &file).await,
    }
}

async fn serve(settings: Settings) -> Result<()> {
    match settings.storage_backend {
        StorageBackend::Memory => {
            warn!("using in-memory storage; posts are lost on restart");
            let state = AppState::new(Arc::new(InMemoryPostRepository::new()));
            server::run_http(&settings, state).await
        }
        StorageBackend::Postgres => {
            let pool = create_pool(settings.require_database()?, settings.app_env).await?;
            run_migrations(&pool).await?;

            let state = AppState::new(Arc::new(PostgresPostRepository::new(pool.clone())));
            let result = server::run_http(&settings, state).await;
            close_pool(pool).await;
            result
        }
    }
}

async fn check_db(settings: &Settings) -> Result<()> {
    let db = settings.require_database()?;
    let options = infrastructure::database::connect_options(db, settings.app_env)?;
    if is_local_host(options.get_host()) {
        warn!("DATABASE_URL points to localhost; this will not work in production");
    }

    let pool = create_pool(db, settings.app_env).await?;
    let version = server_version(&pool).await;
    close_pool(pool).await;

    println!("Database connection successful");
    println!("PostgreSQL version: {}", version?);
    Ok(())
}

async fn print_tables(settings: &Settings) -> Result<()> {
    let pool = create_pool(settings.require_database()?, settings.app_env).await?;
    let tables = list_tables(&pool).await;
    close_pool(pool).await;

    let tables = tables?;
    if tables.is_empty() {
        println!("No tables found in the database");
    } else {
        println!("Existing tables:");
        for table in tables {
            println!("  - {table}");
        }
    }
    Ok(())
}

async fn run_sql(settings: &Settings, file: &Path) -> Result<()> {
    let sql = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("SQL file not found: {}", file.display()))?;
    info!(
        file = %file.display(),
        size_kb = sql.len() as f64 / 1024.0,
        "executing SQL script"
    );

    let pool = create_pool(settings.require_database()?, settings.app_env).await?;
    let rows = execute_script(&pool, &sql).await;
    close_pool(pool).await;

    println!("SQL executed successfully, rows affected: {}", rows?);
    Ok(())
}

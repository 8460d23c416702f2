//! tally CLI
//!
//! Runs the API server and a few maintenance tasks.

use std::net::SocketAddr;

use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tally_auth::{AuthError, User};
use tally_server::{build_router, serve, AppState};
use tally_store::{create_tables, Invoices};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Invoicing back end.
#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL.
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:tally.sqlite3?mode=rwc")]
    database: String,

    /// Session lifetime in days.
    #[arg(long, env = "TALLY_SESSION_DAYS", default_value_t = 14)]
    session_days: i64,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API.
    Serve {
        /// Address to listen on.
        #[arg(short, long, env = "TALLY_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },

    /// Create the database tables.
    InitDb,

    /// Create a user account.
    CreateUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "TALLY_PASSWORD")]
        password: String,
    },

    /// Move every sent invoice past its due date to overdue.
    MarkOverdue,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&cli.database)
        .await?;
    create_tables(&pool).await?;

    match cli.command {
        Commands::Serve { bind } => {
            let state = AppState::new(pool, cli.session_days);
            let router = build_router(&state)?;
            serve(bind, router).await?;
        }

        Commands::InitDb => {
            info!("Database tables are ready.");
        }

        Commands::CreateUser {
            name,
            email,
            password,
        } => {
            match User::get_by_email(&pool, &email).await {
                Ok(_) => anyhow::bail!("an account with email {email} already exists"),
                Err(AuthError::UserNotFound) => {}
                Err(e) => return Err(e.into()),
            }
            let mut user = User::create(&name, &email, &password)?;
            user.save(&pool).await?;
            info!(user_id = user.id, email = %user.email, "User created.");
        }

        Commands::MarkOverdue => {
            let today = Utc::now().date_naive();
            let updated = Invoices::mark_overdue(&pool, today, None).await?;
            info!(updated, "Overdue sweep finished.");
        }
    }

    Ok(())
}

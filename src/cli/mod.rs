pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "traceability-hub")]
#[command(about = "Traceability Hub - organization-scoped supply-chain API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, help = "Port to bind; overrides HUB_API_PORT/PORT")]
        port: Option<u16>,
        #[arg(long, help = "Use the in-memory store instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Connect to DATABASE_URL and run a liveness query")]
    CheckDb,

    #[command(about = "Create any missing tables and unique constraints")]
    Migrate,

    #[command(about = "Issue a bearer token signed with the identity secret (development only)")]
    IssueToken {
        #[arg(help = "External user id (token subject)")]
        sub: String,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, default_value_t = 24, help = "Validity in hours")]
        hours: i64,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => commands::serve::handle(port, memory).await,
        Commands::CheckDb => commands::check_db::handle().await,
        Commands::Migrate => commands::migrate::handle().await,
        Commands::IssueToken { sub, email, hours } => commands::token::handle(&sub, email, hours),
    }
}

//! schemaplan CLI
//!
//! Command-line tool for planning reversible MySQL migrations.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use schemaplan::prelude::*;

/// Plan reversible MySQL schema migrations.
#[derive(Parser)]
#[command(name = "schemaplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the changes of a JSON change file.
    Plan {
        /// Path to the change file.
        changes: PathBuf,

        /// Plan name.
        #[arg(short, long, default_value = "changes")]
        name: String,

        /// Database URL to probe for server flavor and defaults.
        #[arg(short, long, env = "DATABASE_URL")]
        database: Option<String>,

        /// Server version when planning offline (e.g. `8.0.36`, `10.3.9-MariaDB`).
        #[arg(long, conflicts_with = "database")]
        server_version: Option<String>,

        /// Server default character set when planning offline.
        #[arg(long, conflicts_with = "database")]
        charset: Option<String>,

        /// Server default collation when planning offline.
        #[arg(long, conflicts_with = "database")]
        collation: Option<String>,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = Format::Sql)]
        format: Format,

        /// Print the rollback script instead of the forward script.
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show what the planner detects on a server.
    Probe {
        /// Database URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Plan {
            changes,
            name,
            database,
            server_version,
            charset,
            collation,
            format,
            reverse,
        } => {
            let server = match database {
                Some(url) => probe(&url).await?,
                None => offline(server_version.as_deref(), charset, collation)?,
            };
            let changes = load_changes(&changes).await?;
            let plan = MysqlPlanner::new(server).plan_changes(&name, &changes)?;
            if !plan.reversible {
                info!("Plan contains statements that cannot be reversed.");
            }

            let output = if reverse {
                render_reverse(&plan, format)?
            } else {
                render(&plan, format)?
            };
            print!("{output}");
        }

        Commands::Probe { database } => {
            let server = probe(&database).await?;
            println!("Flavor:    {}", server.flavor);
            println!("Version:   {}", server.version);
            println!("Charset:   {}", server.charset);
            println!("Collation: {}", server.collation);
        }
    }

    Ok(())
}

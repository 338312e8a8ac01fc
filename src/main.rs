//! # CyberClub CLI
//!
//! Club content service and chat bot.
//!
//! Usage:
//!   cyberclub serve                    # Start the content API
//!   cyberclub bot                      # Start the Discord bot + scheduler
//!   cyberclub seed-quotes              # Load the sample quote set once
//!   cyberclub config show              # Show configuration
//!   cyberclub info                     # Show system info

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cyberclub_core::ClubConfig;
use cyberclub_core::types::Quote;
use cyberclub_store::ContentStore;

#[derive(Parser)]
#[command(
    name = "cyberclub",
    version,
    about = "🛡️ CyberClub — club events, facts, jokes, quotes, and quizzes",
    long_about = "Content service and Discord bot for a cybersecurity club.\n\
        The gateway serves the content API; the bot renders it in chat and\n\
        runs the recurring lifecycle jobs."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP content API
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start the Discord bot and scheduler
    Bot,

    /// Populate the quotes collection with the sample set (runs once)
    SeedQuotes,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show system info
    Info,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Reset to defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "cyberclub=debug,cyberclub_bot=debug,cyberclub_gateway=debug,tower_http=debug"
    } else {
        "cyberclub=info,cyberclub_bot=info,cyberclub_gateway=info,cyberclub_scheduler=info,cyberclub_channels=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Load config
    let mut config = if let Some(path) = &cli.config {
        ClubConfig::load_from(std::path::Path::new(path))?
    } else {
        ClubConfig::load()?
    };

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let store = Arc::new(ContentStore::open(&config.store.db_path())?);
            cyberclub_gateway::serve(config.gateway.clone(), store).await?;
        }

        Commands::Bot => {
            cyberclub_bot::run(config).await?;
        }

        Commands::SeedQuotes => {
            let store = ContentStore::open(&config.store.db_path())?;
            let existing = store.list_quotes()?.len();
            if existing > 0 {
                println!("⚠️  Quotes collection already has {existing} entries. Skipping.");
                return Ok(());
            }
            let quotes = sample_quotes();
            for quote in &quotes {
                store.create_quote(quote)?;
            }
            println!("✅ Added {} quotes to the store.", quotes.len());
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("Config file: {}", ClubConfig::default_path().display());
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Reset => {
                ClubConfig::default().save()?;
                println!(
                    "✅ Config reset to defaults at {}",
                    ClubConfig::default_path().display()
                );
            }
        },

        Commands::Info => {
            println!("🛡️ CyberClub v{}", env!("CARGO_PKG_VERSION"));
            println!("   Platform: {}/{}", std::env::consts::OS, std::env::consts::ARCH);
            println!("   Config:   {}", ClubConfig::default_path().display());
            println!("   Store:    {}", config.store.db_path().display());
            println!("   Gateway:  http://{}:{}", config.gateway.host, config.gateway.port);
        }
    }

    Ok(())
}

fn sample_quotes() -> Vec<Quote> {
    [
        (
            "The only truly secure system is one that is powered off, cast in a block of \
             concrete and sealed in a lead-lined room.",
            "Gene Spafford",
        ),
        ("Security is not a product, but a process.", "Bruce Schneier"),
        ("To be secure, you must be paranoid, but not crazy.", "Kevin Mitnick"),
        (
            "There are two types of companies: those that have been hacked, and those who \
             don't know they have been hacked.",
            "John Chambers",
        ),
        (
            "Passwords are like underwear: don't let people see it, change it often, and \
             don't share it.",
            "Chris Pirillo",
        ),
        ("In God we trust. All others must bring data.", "W. Edwards Deming"),
        (
            "Privacy is not about having something to hide. It's about having something \
             to protect.",
            "Unknown",
        ),
        ("The best way to predict the future is to invent it.", "Alan Kay"),
    ]
    .into_iter()
    .map(|(content, author)| Quote::new(content, author))
    .collect()
}

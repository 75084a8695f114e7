use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "emopilot-cli", version, about = "Emotion Pilot CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a mission on a virtual clock
    Mission {
        #[command(subcommand)]
        action: commands::mission::MissionAction,
    },
    /// Build and inspect decks
    Deck {
        #[command(subcommand)]
        action: commands::deck::DeckAction,
    },
    /// Browse scenario cards and report options
    Cards {
        #[command(subcommand)]
        action: commands::cards::CardsAction,
    },
    /// Career experience points
    Xp {
        #[command(subcommand)]
        action: commands::xp::XpAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EMOPILOT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Mission { action } => commands::mission::run(action),
        Commands::Deck { action } => commands::deck::run(action),
        Commands::Cards { action } => commands::cards::run(action),
        Commands::Xp { action } => commands::xp::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

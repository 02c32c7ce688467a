pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tripgenie_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

use crate::commands::chat::ChatOptions;
use crate::commands::destinations::DestinationQuery;

#[derive(Debug, Parser)]
#[command(
    name = "tripgenie",
    about = "TripGenie budget trip planner",
    long_about = "Plan budget trips across India in a chat, query the destination catalog, and inspect configuration.",
    after_help = "Examples:\n  tripgenie chat\n  tripgenie destinations --origin Pune --month Feb --tier moderate\n  tripgenie config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a tripgenie.toml file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Chat with the planner over stdin; /reset starts over, /quit exits")]
    Chat {
        #[arg(long, help = "Resume or name a session id")]
        session: Option<String>,
        #[arg(long, help = "Keep sessions in memory instead of the configured database")]
        ephemeral: bool,
    },
    #[command(about = "Print destinations matching the filters as JSON")]
    Destinations {
        #[arg(long)]
        origin: String,
        #[arg(long, help = "Three-letter month, defaults to the current month")]
        month: Option<String>,
        #[arg(long, help = "comfortable|moderate|budget|very_tight")]
        tier: Option<String>,
        #[arg(long, help = "beach|mountains|culture|adventure|mix")]
        preference: Option<String>,
        #[arg(long, help = "Include destinations without a direct route")]
        multi_leg: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Apply pending session store migrations")]
    Migrate,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config.logging);
    }

    let result = match cli.command {
        Command::Chat { session, ephemeral } => {
            commands::chat::run(&options, ChatOptions { session, ephemeral })
        }
        Command::Destinations { origin, month, tier, preference, multi_leg } => {
            commands::destinations::run(
                &options,
                DestinationQuery { origin, month, tier, preference, multi_leg },
            )
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Migrate => commands::migrate::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so command output on stdout stays parseable.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

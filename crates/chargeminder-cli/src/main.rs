use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod console;
mod context;

#[derive(Parser)]
#[command(name = "chargeminder", version, about = "ChargeMinder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily check and print the current status as JSON
    Status,
    /// Mark today as charged
    Charge {
        /// Battery percentage before charging
        #[arg(long)]
        level: Option<u32>,
    },
    /// Admit you forgot: resets the streak
    Forgot,
    /// Simulated battery level
    Battery {
        #[command(subcommand)]
        action: commands::battery::BatteryAction,
    },
    /// Charge history and statistics
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// User settings (notifications, reminder interval)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Notification permission and test reminders
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Schedule the daily reminder and print when it is due
    Remind {
        /// Local time, HH:MM (defaults to the configured time)
        #[arg(long)]
        at: Option<String>,
    },
    /// Run reminders in the foreground until Ctrl-C
    Watch,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHARGEMINDER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Status => commands::status::run_status(),
        Commands::Charge { level } => commands::status::run_charge(level),
        Commands::Forgot => commands::status::run_forgot(),
        Commands::Battery { action } => commands::battery::run(action),
        Commands::History { action } => commands::history::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Remind { at } => commands::remind::run(at),
        Commands::Watch => commands::watch::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

//! Solace CLI - authenticated chat sessions from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use solace_core::SolaceError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

mod commands;

#[derive(Parser)]
#[command(name = "solace")]
#[command(about = "Chat with a completion service under a registered account", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and the user data file
    #[arg(long, global = true, default_value = ".solace")]
    data_dir: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory with a default config
    Init,
    /// Register a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,
        /// E-mail address used to log in
        #[arg(short, long)]
        email: String,
    },
    /// Log in and chat
    Chat {
        #[arg(short, long)]
        email: String,
        /// Instructions for this session instead of the configured ones
        #[arg(short, long)]
        instructions: Option<String>,
    },
    /// Change name, e-mail or credentials
    Profile {
        #[arg(short, long)]
        email: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New e-mail address
        #[arg(long)]
        new_email: Option<String>,
        /// Prompt for a new password and passcode
        #[arg(long)]
        change_credentials: bool,
    },
    /// Delete an account and its history
    Delete {
        #[arg(short, long)]
        email: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List registered users
    Users,
    /// Print a user's chat history
    History {
        #[arg(short, long)]
        email: String,
    },
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.as_path();

    match cli.command {
        Commands::Init => commands::init::run(data_dir),
        Commands::Register { name, email } => commands::register::run(data_dir, &name, &email),
        Commands::Chat {
            email,
            instructions,
        } => commands::chat::run(data_dir, &email, instructions.as_deref()),
        Commands::Profile {
            email,
            name,
            new_email,
            change_credentials,
        } => commands::profile::run(
            data_dir,
            &email,
            name.as_deref(),
            new_email.as_deref(),
            change_credentials,
        ),
        Commands::Delete { email, yes } => commands::delete::run(data_dir, &email, yes),
        Commands::Users => commands::users::run(data_dir),
        Commands::History { email } => commands::history::run(data_dir, &email),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_file.as_deref()) {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            let hint = e
                .chain()
                .find_map(|cause| cause.downcast_ref::<SolaceError>())
                .and_then(SolaceError::recovery_suggestion);
            if let Some(hint) = hint {
                eprintln!("  {} {}", style("→").cyan(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

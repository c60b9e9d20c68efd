//! Interactive chat session.

use super::history::print_turn;
use super::{login, open_directory};
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use solace_core::{ChatSession, CompletionClient, HttpTransport};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

const QUIT: &str = "/quit";

/// Logs in, then reads messages from stdin until `/quit` or end of input.
///
/// The transcript is saved when the loop ends, including turns that
/// recorded a failed request.
pub fn run(data_dir: &Path, email: &str, instructions: Option<&str>) -> Result<()> {
    let (config, mut directory) = open_directory(data_dir)?;

    let transport =
        HttpTransport::from_config(&config.completion).context("Failed to set up the client")?;
    let client = CompletionClient::from_config(transport, &config.completion)?;

    let user = login(&mut directory, email)?;
    let mut session = ChatSession::begin(user);

    for turn in session.transcript() {
        print_turn(turn);
    }
    println!(
        "{}",
        style(format!("Type a message, or {} to leave.", QUIT)).dim()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}: ", style("You").green().bold());
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line.context("Failed to read input")?,
            None => {
                println!();
                break;
            }
        };
        let message = line.trim();
        if message == QUIT {
            break;
        }
        if message.is_empty() {
            continue;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for a reply...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = session.send(&client, message, instructions);
        spinner.finish_and_clear();

        match result {
            Ok(reply) => println!("{}: {}", style("AI").cyan().bold(), reply),
            Err(e) => {
                println!("{} {}", style("error fetching response:").red(), e);
                if let Some(hint) = e.recovery_suggestion() {
                    println!("  {} {}", style("→").cyan(), hint);
                }
            }
        }
    }

    let added = session.new_turns().len();
    session
        .end(&mut directory)
        .context("Failed to save chat history")?;
    println!(
        "{} Saved {} new turn(s) for {}",
        style("✓").green(),
        added,
        email
    );
    Ok(())
}

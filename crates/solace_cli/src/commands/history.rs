//! Print a user's chat history.

use super::{login, open_directory};
use anyhow::Result;
use console::style;
use solace_core::{Speaker, Turn};
use std::path::Path;

pub fn run(data_dir: &Path, email: &str) -> Result<()> {
    let (_, mut directory) = open_directory(data_dir)?;
    let user = login(&mut directory, email)?;

    if user.transcript().is_empty() {
        println!("No chat history for {}", user.email());
        return Ok(());
    }

    for turn in user.transcript() {
        print_turn(turn);
    }
    Ok(())
}

/// Prints a turn with its speaker tag coloured by speaker.
pub(crate) fn print_turn(turn: &Turn) {
    let tag = match turn.speaker {
        Speaker::Human => style(turn.speaker.tag()).green().bold(),
        Speaker::Assistant => style(turn.speaker.tag()).cyan().bold(),
        Speaker::SystemNotice => style(turn.speaker.tag()).yellow(),
    };
    println!("{}: {}", tag, turn.text);
}

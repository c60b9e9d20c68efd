//! Register a new account.

use super::{open_directory, prompt_new_secret};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;

pub fn run(data_dir: &Path, name: &str, email: &str) -> Result<()> {
    let (_, mut directory) = open_directory(data_dir)?;

    let secret = prompt_new_secret("Password")?;
    let passcode = prompt_new_secret("Passcode")?;

    let user = directory
        .create(name, email, &secret, &passcode)
        .context("Registration failed")?;

    println!(
        "{} Registered {} <{}>",
        style("✓").green(),
        style(user.name()).bold(),
        user.email()
    );
    Ok(())
}

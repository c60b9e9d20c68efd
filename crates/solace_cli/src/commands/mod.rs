//! CLI commands.

pub mod chat;
pub mod delete;
pub mod history;
pub mod init;
pub mod profile;
pub mod register;
pub mod users;

use anyhow::{anyhow, Context, Result};
use console::{style, Term};
use solace_core::{Config, JsonFileStore, User, UserDirectory};
use std::path::Path;

/// Loads config and the user directory of a data directory.
pub(crate) fn open_directory(data_dir: &Path) -> Result<(Config, UserDirectory<JsonFileStore>)> {
    let config = Config::load(data_dir).context("Failed to load config")?;
    let store = JsonFileStore::new(config.users_path(data_dir))
        .context("Failed to open user data file")?;

    let mut directory = UserDirectory::new(store);
    let report = directory.load().context("Failed to load user data")?;
    if report.skipped > 0 {
        eprintln!(
            "{} skipped {} unreadable user record(s), see the log for details",
            style("⚠").yellow(),
            report.skipped
        );
    }

    Ok((config, directory))
}

/// Reads a line without echoing it.
pub(crate) fn prompt_secret(label: &str) -> Result<String> {
    let term = Term::stderr();
    term.write_str(&format!("{}: ", label))?;
    term.read_secure_line()
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))
}

/// Reads a secret twice and requires both entries to match.
pub(crate) fn prompt_new_secret(label: &str) -> Result<String> {
    let first = prompt_secret(label)?;
    let second = prompt_secret(&format!("Repeat {}", label.to_lowercase()))?;
    if first != second {
        return Err(anyhow!("{} entries do not match", label));
    }
    Ok(first)
}

/// Prompts for password and passcode and authenticates.
pub(crate) fn login<'a>(
    directory: &'a mut UserDirectory<JsonFileStore>,
    email: &str,
) -> Result<&'a User> {
    let secret = prompt_secret("Password")?;
    let passcode = prompt_secret("Passcode")?;
    directory
        .authenticate(email, &secret, &passcode)
        .context("Login failed")
}

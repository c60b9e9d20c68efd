//! Edit an account's profile.

use super::{login, open_directory, prompt_new_secret};
use anyhow::{anyhow, Context, Result};
use console::style;
use solace_core::ProfileUpdate;
use std::path::Path;

/// Authenticates, then applies all requested edits with a single save.
pub fn run(
    data_dir: &Path,
    email: &str,
    name: Option<&str>,
    new_email: Option<&str>,
    change_credentials: bool,
) -> Result<()> {
    let (_, mut directory) = open_directory(data_dir)?;
    login(&mut directory, email)?;

    let mut update = ProfileUpdate::new();
    if let Some(name) = name {
        update = update.name(name);
    }
    if let Some(new_email) = new_email {
        update = update.email(new_email);
    }
    if change_credentials {
        let secret = prompt_new_secret("New password")?;
        let passcode = prompt_new_secret("New passcode")?;
        update = update.credentials(secret, passcode);
    }

    if update.is_empty() {
        return Err(anyhow!(
            "Nothing to change. Pass --name, --new-email or --change-credentials."
        ));
    }

    directory
        .update_profile(email, update)
        .context("Profile update failed")?;

    let current = new_email.unwrap_or(email);
    let user = directory.get(current)?;
    println!(
        "{} Profile saved: {} <{}>",
        style("✓").green(),
        style(user.name()).bold(),
        user.email()
    );
    Ok(())
}

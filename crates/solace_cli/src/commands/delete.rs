//! Delete an account.

use super::{login, open_directory};
use anyhow::{Context, Result};
use console::{style, Term};
use std::path::Path;

/// Deletes an account after re-authentication and confirmation.
pub fn run(data_dir: &Path, email: &str, yes: bool) -> Result<()> {
    let (_, mut directory) = open_directory(data_dir)?;
    let user = login(&mut directory, email)?;
    let (name, turns) = (user.name().to_string(), user.transcript().len());

    if !yes {
        let term = Term::stderr();
        term.write_str(&format!(
            "Delete {} <{}> and {} chat turns? [y/N] ",
            name, email, turns
        ))?;
        let answer = term.read_line().context("Failed to read confirmation")?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted");
            return Ok(());
        }
    }

    directory.delete(email).context("Deletion failed")?;
    println!("{} Deleted {} <{}>", style("✓").green(), name, email);
    Ok(())
}

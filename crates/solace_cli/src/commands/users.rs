//! List registered users.

use super::open_directory;
use anyhow::Result;
use console::style;
use std::path::Path;

pub fn run(data_dir: &Path) -> Result<()> {
    let (_, directory) = open_directory(data_dir)?;

    if directory.is_empty() {
        println!("No registered users");
        return Ok(());
    }

    println!("{}", style(format!("Users ({}):", directory.len())).bold());
    for user in directory.users() {
        println!(
            "  {} <{}> {}",
            user.name(),
            style(user.email()).cyan(),
            style(format!("{} turns", user.transcript().len())).dim()
        );
    }
    Ok(())
}

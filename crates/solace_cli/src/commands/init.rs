//! Initialize a solace data directory.

use anyhow::{Context, Result};
use solace_core::{Config, JsonFileStore, UserDirectory, CONFIG_FILE};
use std::fs;
use std::path::Path;

/// Creates the data directory, a default config and an empty user file.
///
/// Existing files are left alone.
pub fn run(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;

    let config_path = data_dir.join(CONFIG_FILE);
    let config = if config_path.exists() {
        println!("Keeping existing {}", config_path.display());
        Config::load(data_dir).context("Failed to load config")?
    } else {
        let config = Config::default();
        config.save(data_dir).context("Failed to write config")?;
        println!("Configuration written to {}", config_path.display());
        config
    };

    let users_path = config.users_path(data_dir);
    if users_path.exists() {
        println!("Keeping existing {}", users_path.display());
    } else {
        let store = JsonFileStore::new(&users_path).context("Failed to open user data file")?;
        UserDirectory::new(store)
            .persist()
            .context("Failed to write user data file")?;
        println!("User data written to {}", users_path.display());
    }

    println!();
    println!("Model: {}", config.completion.model);
    println!("API key is read from ${}", config.completion.api_key_env);

    Ok(())
}

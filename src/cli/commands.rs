use anyhow::Result;

use crate::{
    app::{init_config, Config},
    display::{render_catalog, DisplayTheme},
    models::ModelRegistry,
};

use super::Commands;

/// Handle subcommands that need no unlocked credentials
///
/// Returns `true` when the command was fully handled.
pub fn handle_command(command: &Commands, config: &Config, theme: &DisplayTheme) -> Result<bool> {
    match command {
        Commands::Init => {
            let (path, created) = init_config()?;
            if created {
                println!("Created default configuration at: {}", path.display());
            } else {
                println!("Configuration already exists at: {}", path.display());
            }
            Ok(true)
        }
        Commands::Models => {
            list_models(config, theme)?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        // Need the vault
        Commands::Chat | Commands::Status | Commands::History { .. } => Ok(false),
    }
}

/// List the model catalog
pub fn list_models(config: &Config, theme: &DisplayTheme) -> Result<()> {
    let registry = ModelRegistry::new(config.registry.clone())?;
    println!("{}", theme.heading("Model catalog (first = auto default, last = failover):"));
    print!("{}", render_catalog(&registry, theme));
    Ok(())
}

/// Show version information
pub fn show_version() {
    println!("Neurolink v{}", env!("CARGO_PKG_VERSION"));
    println!("   Passcode-gated, self-healing LLM router");
}

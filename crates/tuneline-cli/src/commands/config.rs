use crate::output::{styled_table, Output};
use crate::ConfigCommands;
use color_eyre::eyre::Context;
use color_eyre::Result;
use comfy_table::Cell;
use media_catalog_config::{Config, PathManager, ProviderKind};
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

pub fn run_config(cmd: ConfigCommands, config_file: &Path, paths: &PathManager, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(config_file, paths, output),
        ConfigCommands::Init { force } => init_config(config_file, force, output),
        ConfigCommands::Validate => {
            let config = Config::load_from_file(config_file)
                .wrap_err_with(|| format!("Failed to load config from {}", config_file.display()))?;
            config.validate().wrap_err("Configuration is invalid")?;
            output.success(format!(
                "Configuration is valid ({} provider(s) enabled)",
                config.enabled_providers().count()
            ));
            Ok(())
        }
    }
}

fn show_config(config_file: &Path, paths: &PathManager, output: &Output) -> Result<()> {
    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'tuneline config init' to create one.");
        return Ok(());
    }

    let config = Config::load_from_file(config_file)
        .wrap_err_with(|| format!("Failed to load config from {}", config_file.display()))?;

    if !output.is_human() {
        output.json(&json!({
            "type": "config",
            "configFile": config_file.display().to_string(),
            "dataDir": paths.data_dir().display().to_string(),
            "config": config,
        }));
        return Ok(());
    }

    let mut info = styled_table(vec!["Setting", "Value"]);
    info.add_row(vec!["Config file".to_string(), config_file.display().to_string()]);
    info.add_row(vec!["Data directory".to_string(), paths.data_dir().display().to_string()]);
    info.add_row(vec!["Debounce".to_string(), format!("{} ms", config.cache.debounce_ms)]);
    info.add_row(vec!["Log level".to_string(), config.logging.level.clone()]);
    output.table(&info);

    let mut providers = styled_table(vec!["#", "Name", "Kind", "Enabled", "Location"]);
    for (position, provider) in config.providers.iter().enumerate() {
        let location = match provider.kind {
            ProviderKind::File => provider
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ProviderKind::Http => provider.base_url.clone().unwrap_or_default(),
        };
        providers.add_row(vec![
            Cell::new(position + 1),
            Cell::new(&provider.name),
            Cell::new(format!("{:?}", provider.kind).to_lowercase()),
            Cell::new(if provider.enabled { "✓".green().to_string() } else { "✗".red().to_string() }),
            Cell::new(location),
        ]);
    }
    output.table(&providers);
    Ok(())
}

fn init_config(config_file: &Path, force: bool, output: &Output) -> Result<()> {
    if config_file.exists() && !force {
        output.warn(format!("{} already exists; use --force to overwrite", config_file.display()));
        return Ok(());
    }

    Config::default()
        .save_to_file(config_file)
        .wrap_err_with(|| format!("Failed to write {}", config_file.display()))?;
    output.success(format!("Wrote default configuration to {}", config_file.display()));
    output.info("Add [[providers]] entries (kind = \"file\" or \"http\") to start browsing.");
    Ok(())
}

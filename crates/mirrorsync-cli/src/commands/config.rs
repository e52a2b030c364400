//! Config command - View and manage mirrorsync configuration
//!
//! Provides the `mirrorsync config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports errors
//! 3. Writes a default configuration file

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use mirrorsync_core::config::Config;
use tracing::info;

use super::CliContext;

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(ctx),
            ConfigCommand::Validate => self.execute_validate(ctx),
            ConfigCommand::Init { force } => self.execute_init(ctx, *force),
        }
    }

    fn execute_show(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();
        let config = ctx.load_config();

        info!(config_path = %config_path.display(), "Showing configuration");

        if ctx.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");
            for line in config.to_yaml()?.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_validate(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();

        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let message = if config_path.exists() {
                    format!("Failed to parse configuration: {e:#}")
                } else {
                    "Configuration file not found. Using defaults.".to_string()
                };
                if ctx.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [message],
                    }));
                } else {
                    formatter.error(&message);
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if ctx.is_json() {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings,
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }

    fn execute_init(&self, ctx: &CliContext, force: bool) -> Result<()> {
        let formatter = ctx.formatter();
        let config_path = ctx.config_path();

        if !write_default_config(config_path, force)? {
            formatter.warn(&format!(
                "{} already exists; pass --force to overwrite",
                config_path.display()
            ));
            return Ok(());
        }

        info!(config_path = %config_path.display(), "Wrote default configuration");
        formatter.success(&format!("Wrote {}", config_path.display()));
        Ok(())
    }
}

/// Writes the defaults to `path`; returns `false` if it exists and `force` is off
fn write_default_config(path: &Path, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create configuration directory")?;
    }
    std::fs::write(path, Config::default().to_yaml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirrorsync").join("config.yaml");

        assert!(write_default_config(&path, false).unwrap());
        let loaded = Config::load(&path).unwrap();
        assert!(loaded.validate().is_empty());
        assert_eq!(loaded.sync.settle_delay_ms, 300);
    }

    #[test]
    fn test_init_respects_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "logging:\n  level: debug\n").unwrap();

        assert!(!write_default_config(&path, false).unwrap());
        assert_eq!(Config::load(&path).unwrap().logging.level, "debug");

        assert!(write_default_config(&path, true).unwrap());
        assert_eq!(Config::load(&path).unwrap().logging.level, "info");
    }
}

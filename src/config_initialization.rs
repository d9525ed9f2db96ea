//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::Settings;
use crate::cli::Cli;

/// Resolve settings following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<Settings> {
    // Step 1 and 2: defaults, overlaid by a config file when there is one
    let mut settings = match cli.config.clone().or_else(Settings::discover) {
        Some(path) => Settings::load_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Settings::default(),
    };

    // Step 3: Override with environment variables
    let env_overrides = settings.apply_env(|name| std::env::var(name).ok())?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    // Step 4: Override with CLI arguments
    apply_cli_configuration_overrides(&mut settings, cli);

    settings.validate()?;
    Ok(settings)
}

/// Apply CLI argument overrides to configuration
fn apply_cli_configuration_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        settings.log.level = level.clone();
    }
    if cli.json_logs {
        settings.log.json = true;
    }
    if let Some(dir) = &cli.output_dir {
        settings.segment.output_dir = dir.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_cli_overrides_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[segment]\noutput_dir = \"/from/file\"\n[log]\nlevel = \"warn\"\n")
            .unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from([
            "segmenter",
            "--config",
            path_arg.as_str(),
            "--output-dir",
            "/from/cli",
            "filename",
            "--clip-id",
            "1",
            "-s",
            "00:00:01.000",
            "-e",
            "00:00:02.000",
        ])
        .unwrap();

        let settings = initialize_configuration_hierarchy(&cli).unwrap();
        assert_eq!(settings.segment.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.log.level, "warn");
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = Cli::try_parse_from([
            "segmenter",
            "--config",
            "/definitely/not/here.toml",
            "sweep",
        ])
        .unwrap();
        assert!(initialize_configuration_hierarchy(&cli).is_err());
    }
}

//! Handler functions for config CLI commands.
//!
//! Implements `stackpage config {path,get,init,export}` subcommands and the
//! TOML key lookup they share.

use std::path::PathBuf;

use stackpage_core::{Error, Result, StackConfig};

use crate::cli::ConfigAction;

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Receives the raw `--config` path (not a loaded config) because `path`
/// and `init` work before a config file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => cmd_config_get(config_path, &key),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
        ConfigAction::Export => {
            let config = StackConfig::load(config_path)?;
            cmd_config_export(&config)
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    match StackConfig::resolve_config_path(config_path) {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!("(file does not exist; run `stackpage config init` to create it)");
            }
            Ok(())
        }
        None => Err(Error::config(
            "Could not determine config directory for this platform",
        )),
    }
}

fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<()> {
    let config = StackConfig::load(config_path)?;
    let value = lookup(&config, key)?;
    println!("{value}");
    Ok(())
}

/// Write a default config file. Existing files need `force`.
fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => StackConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let toml_str = StackConfig::default().to_toml_string()?;
    std::fs::write(&path, &toml_str).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Config file created at {}", path.display());
    Ok(())
}

fn cmd_config_export(config: &StackConfig) -> Result<()> {
    for line in env_assignments(config)? {
        println!("{line}");
    }
    Ok(())
}

/// `KEY=value` lines in the order [`StackConfig::to_env_vars`] yields them.
fn env_assignments(config: &StackConfig) -> Result<Vec<String>> {
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect())
}

// ============================================================================
// TOML key helpers
// ============================================================================

/// Render the value at `key` of the serialized config.
fn lookup(config: &StackConfig, key: &str) -> Result<String> {
    let value = toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))?;
    get_nested_value(&value, key)
        .map(format_toml_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

fn get_nested_value<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| format!("{value:?}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path.to_str().unwrap().to_string()
    }

    // ------------------------------------------------------------------------
    // cmd_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_path_explicit() {
        assert!(cmd_config_path(Some("/explicit/config.toml")).is_ok());
    }

    // ------------------------------------------------------------------------
    // cmd_config_get tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_lookup_reads_file_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
                region = "AZURE-NA"
                api_key = "blt_from_file"
                environment = "staging"
                timeout_secs = 15
            "#,
        );
        let config = StackConfig::load(Some(&path)).unwrap();

        assert_eq!(lookup(&config, "region").unwrap(), "AZURE-NA");
        assert_eq!(lookup(&config, "api_key").unwrap(), "blt_from_file");
        assert_eq!(lookup(&config, "timeout_secs").unwrap(), "15");
        assert_eq!(lookup(&config, "preview").unwrap(), "false");
    }

    #[test]
    fn test_cmd_config_get_missing_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(&dir, "region = \"EU\"\n");

        let result = cmd_config_get(Some(&path), "nonexistent.key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_init tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_init_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stackpage").join("config.toml");

        cmd_config_init(Some(path.to_str().unwrap()), false).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("region = \"EU\""));
        assert!(content.contains("use_managed_endpoints = true"));
    }

    #[test]
    fn test_cmd_config_init_no_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(&dir, "existing");

        let result = cmd_config_init(Some(&path), false);
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[test]
    fn test_cmd_config_init_force_overwrites() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_config(&dir, "old content");

        cmd_config_init(Some(&path), true).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("region"));
    }

    // ------------------------------------------------------------------------
    // cmd_config_export tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_cmd_config_export() {
        assert!(cmd_config_export(&StackConfig::default()).is_ok());
    }

    #[test]
    fn test_env_assignments_carry_region() {
        let config = StackConfig {
            region: "AZURE-EU".into(),
            ..StackConfig::default()
        };
        let lines = env_assignments(&config).unwrap();
        assert!(lines.iter().any(|l| l == "CONTENTSTACK_REGION=AZURE-EU"));
        assert!(lines.iter().all(|l| l.starts_with("CONTENTSTACK_") && l.contains('=')));
    }

    // ------------------------------------------------------------------------
    // TOML helper tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_get_nested_value() {
        let val: toml::Value = toml::from_str("region = \"EU\"\n[extra]\nport = 3000").unwrap();
        assert_eq!(
            get_nested_value(&val, "region"),
            Some(&toml::Value::String("EU".into()))
        );
        assert_eq!(
            get_nested_value(&val, "extra.port"),
            Some(&toml::Value::Integer(3000))
        );
        assert!(get_nested_value(&val, "extra.missing").is_none());
        assert!(get_nested_value(&val, "region.deeper").is_none());
    }

    #[test]
    fn test_format_toml_value() {
        assert_eq!(format_toml_value(&toml::Value::String("hello".into())), "hello");
        assert_eq!(format_toml_value(&toml::Value::Integer(42)), "42");
        assert_eq!(format_toml_value(&toml::Value::Boolean(true)), "true");
    }
}

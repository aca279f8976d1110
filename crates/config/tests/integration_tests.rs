//! Integration tests for the configuration system

use phpmanager_config::{
    backup_path, AppConfig, Config, ConfigManager, ConfigSection, DisplayConfig, LogLevel,
    MessageTable, CONFIG_VERSION,
};
use phpmanager_core::{GroupBy, IniError, SearchField};
use std::path::PathBuf;
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    assert!(manager.initialize()?);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);

    let mut modified = config.clone();
    modified.app.php_ini_path = Some(PathBuf::from("/etc/php/8.3/fpm/php.ini"));
    modified.display.search_field = SearchField::Value;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded, modified);

    manager.reset()?;
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_config_validation_integration() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    manager.save(&Config::default())?;
    assert!(manager.validate()?.is_empty());

    let mut invalid = Config::default();
    invalid.app.php_ini_path = Some(PathBuf::from("/etc/php/php.ini.dist"));
    assert!(manager.save(&invalid).is_err());

    // The rejected save left the previous file in place
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_atomic_save_keeps_backup() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    manager.save(&Config::default())?;
    assert!(manager.config_path().exists());

    manager.update(|config| config.app.log_level = LogLevel::Trace)?;

    let backup = backup_path(&manager.config_path());
    assert!(backup.exists());
    let previous: Config = toml::from_str(&std::fs::read_to_string(backup)?)?;
    assert_eq!(previous.app.log_level, AppConfig::default().log_level);

    Ok(())
}

#[test]
fn test_all_sections_default_are_valid() {
    assert!(AppConfig::default().validate().is_ok());
    assert!(DisplayConfig::default().validate().is_ok());
    assert!(MessageTable::default().validate().is_ok());
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_merge_functionality() {
    let mut base = Config::default();
    let mut override_config = Config::default();

    override_config.app.backup_on_save = false;
    override_config.display.group_by_section = false;
    override_config.messages.not_found = "Gone.".to_string();

    base.merge(override_config);

    assert!(!base.app.backup_on_save);
    assert_eq!(base.display.group_by(), GroupBy::None);
    assert_eq!(base.messages.not_found, "Gone.");
}

#[test]
fn test_partial_file_fills_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(
        manager.config_path(),
        "[display]\nsearch_field = \"value\"\n",
    )?;

    let config = manager.load()?;
    assert_eq!(config.display.search_field, SearchField::Value);
    assert!(config.display.group_by_section);
    assert_eq!(config.app, AppConfig::default());
    assert_eq!(config.messages, MessageTable::default());

    Ok(())
}

#[test]
fn test_messages_describe_engine_errors() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(
        manager.config_path(),
        "[messages]\nnot_found = \"Setting vanished.\"\n",
    )?;

    let config = manager.load()?;
    let text = config
        .messages
        .describe(&IniError::NotFound("#4".to_string()));
    assert!(text.starts_with("Setting vanished."));

    Ok(())
}

#[test]
fn test_graceful_degradation_on_load_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(manager.config_path(), "version = \"one\"\n")?;

    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());

    Ok(())
}

#[test]
fn test_serialization_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let mut original = Config::default();
    original.app.php_ini_path = Some(PathBuf::from("C:\\PHP\\php.ini"));
    let toml_string = toml::to_string(&original)?;
    let deserialized: Config = toml::from_str(&toml_string)?;
    assert_eq!(original, deserialized);
    Ok(())
}

#[test]
fn test_unset_ini_path_is_not_written() -> Result<(), Box<dyn std::error::Error>> {
    let toml_string = toml::to_string(&Config::default())?;
    assert!(!toml_string.contains("php_ini_path"));
    Ok(())
}

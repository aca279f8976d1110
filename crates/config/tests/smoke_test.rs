//! Comprehensive smoke test

use phpmanager_config::{backup_path, write_atomic, Config, ConfigManager, LogLevel};
use phpmanager_core::{IniError, SearchField};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn smoke_test_complete_workflow() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();

    println!("\n=== CONFIG SYSTEM SMOKE TEST ===\n");

    println!("1. Creating ConfigManager...");
    let manager = ConfigManager::with_directory(config_dir.clone())?;
    assert!(!manager.config_path().exists());
    println!("   ✓ Manager created");

    println!("2. Initializing config...");
    assert!(manager.initialize()?);
    assert!(manager.config_path().exists());
    println!("   ✓ Config file created");

    println!("3. Loading and validating default config...");
    assert_eq!(manager.load()?, Config::default());
    assert!(manager.validate()?.is_empty());
    println!("   ✓ Default config is valid");

    println!("4. Pointing at a php.ini...");
    let ini_path = config_dir.join("php.ini");
    manager.update(|config| {
        config.app.php_ini_path = Some(ini_path.clone());
        config.app.log_level = LogLevel::Info;
        config.display.search_field = SearchField::Section;
    })?;
    let reloaded = manager.load()?;
    assert_eq!(reloaded.app.php_ini_path.as_deref(), Some(ini_path.as_path()));
    println!("   ✓ Changes persisted correctly");

    println!("5. Writing php.ini through the shared atomic writer...");
    write_atomic(&ini_path, "[PHP]\nmemory_limit = 128M\n", reloaded.app.backup_on_save)?;
    write_atomic(&ini_path, "[PHP]\nmemory_limit = 256M\n", reloaded.app.backup_on_save)?;
    assert_eq!(
        std::fs::read_to_string(backup_path(&ini_path))?,
        "[PHP]\nmemory_limit = 128M\n"
    );
    println!("   ✓ Backup kept");

    println!("6. Rejecting an invalid config...");
    let mut invalid = reloaded.clone();
    invalid.app.php_ini_path = Some(PathBuf::from("php.txt"));
    assert!(manager.save(&invalid).is_err());
    assert_eq!(manager.load()?, reloaded);
    println!("   ✓ Invalid config rejected");

    println!("7. Formatting messages...");
    let message = reloaded
        .messages
        .describe(&IniError::invalid_setting("", "name must not be empty"));
    assert!(message.contains("name must not be empty"));
    println!("   ✓ {}", message);

    println!("8. Handling a corrupted file...");
    std::fs::write(manager.config_path(), "invalid { toml syntax")?;
    assert!(manager.load().is_err());
    assert_eq!(manager.load_or_default(), Config::default());
    println!("   ✓ Corrupted file handled safely");

    println!("9. Resetting to defaults...");
    manager.reset()?;
    assert_eq!(manager.load()?, Config::default());
    println!("   ✓ Config reset to defaults");

    println!("\n=== ALL SMOKE TESTS PASSED ===\n");

    Ok(())
}

#[test]
fn smoke_test_stress() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;
    manager.initialize()?;

    for i in 0..100 {
        manager.update(|config| {
            config.display.group_by_section = i % 2 == 0;
        })?;
    }

    let final_config = manager.load()?;
    assert!(!final_config.display.group_by_section);
    Ok(())
}

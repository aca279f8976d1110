// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use phpmanager_config::{Config, ConfigManager};
use std::path::PathBuf;

mod commands;
mod store;

use commands::CliContext;
use store::IniStore;

fn build_cli() -> Command {
    Command::new("phpini")
        .version("0.1.0")
        .author("phpmanager Team")
        .about("Inspect and edit php.ini settings")
        .arg(
            Arg::new("ini")
                .short('i')
                .long("ini")
                .value_name("PATH")
                .help("php.ini to operate on (defaults to app.php_ini_path from the config)")
                .global(true),
        )
        .arg(
            Arg::new("config-dir")
                .long("config-dir")
                .value_name("DIR")
                .help("Directory holding config.toml")
                .global(true),
        )
        .subcommand(
            Command::new("list")
                .about("List all settings")
                .arg(
                    Arg::new("group")
                        .short('g')
                        .long("group")
                        .help("Group settings under their sections")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("flat")
                        .long("flat")
                        .help("List settings in file order without grouping")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("group"),
                ),
        )
        .subcommand(Command::new("sections").about("List section names"))
        .subcommand(
            Command::new("get")
                .about("Show the effective value of a setting")
                .arg(Arg::new("name").required(true).value_name("NAME").help("Setting name")),
        )
        .subcommand(
            Command::new("set")
                .about("Add a setting or update its effective value")
                .arg(Arg::new("name").required(true).value_name("NAME").help("Setting name"))
                .arg(Arg::new("value").required(true).value_name("VALUE").help("New value"))
                .arg(
                    Arg::new("section")
                        .short('s')
                        .long("section")
                        .value_name("SECTION")
                        .help("Section for a new setting"),
                ),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove one occurrence of a setting")
                .arg(Arg::new("name").required(true).value_name("NAME").help("Setting name"))
                .arg(
                    Arg::new("occurrence")
                        .short('n')
                        .long("occurrence")
                        .value_name("N")
                        .help("Which occurrence to remove, counting from 1 in file order")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Skip confirmation prompt")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search settings by name, value or section")
                .arg(
                    Arg::new("field")
                        .short('f')
                        .long("field")
                        .value_name("FIELD")
                        .help("Field to search (defaults to display.search_field)")
                        .value_parser(["name", "value", "section"]),
                )
                .arg(Arg::new("text").required(true).value_name("TEXT").help("Text to look for")),
        )
        .subcommand(Command::new("limits").about("Show runtime limits"))
        .subcommand(
            Command::new("limits-set")
                .about("Set runtime limits, e.g. memory_limit=256M")
                .arg(
                    Arg::new("assignments")
                        .required(true)
                        .num_args(1..)
                        .value_name("NAME=VALUE")
                        .help("Runtime limit assignments"),
                ),
        )
        .subcommand(Command::new("path").about("Show the location of php.ini"))
        .subcommand(Command::new("config-init").about("Write a default config file"))
}

fn config_manager(config_dir: Option<&String>) -> Result<ConfigManager> {
    match config_dir {
        Some(dir) => ConfigManager::with_directory(PathBuf::from(dir)),
        None => ConfigManager::new(),
    }
    .context("Failed to locate config directory")
}

fn resolve_ini_path(arg: Option<&String>, config: &Config) -> Result<PathBuf> {
    arg.map(PathBuf::from)
        .or_else(|| config.app.php_ini_path.clone())
        .context("No php.ini given; pass --ini PATH or set app.php_ini_path in the config")
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let manager = config_manager(matches.get_one::<String>("config-dir"))?;
    let config = manager
        .load_with_env_overrides()
        .unwrap_or_else(|e| {
            eprintln!("Config error: {}, using defaults", e);
            Config::default()
        });

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.app.log_level.to_string()),
    )
    .init();

    if let Some(("config-init", _)) = matches.subcommand() {
        return commands::config_init(&manager);
    }

    let ini_path = resolve_ini_path(matches.get_one::<String>("ini"), &config)?;
    let ctx = CliContext {
        store: IniStore::new(ini_path, config.app.backup_on_save),
        config,
    };

    match matches.subcommand() {
        Some(("list", sub_matches)) => commands::list_settings(&ctx, sub_matches).await,
        Some(("sections", _)) => commands::list_sections(&ctx).await,
        Some(("get", sub_matches)) => commands::get_setting(&ctx, sub_matches).await,
        Some(("set", sub_matches)) => commands::set_setting(&ctx, sub_matches).await,
        Some(("remove", sub_matches)) => commands::remove_setting(&ctx, sub_matches).await,
        Some(("search", sub_matches)) => commands::search_settings(&ctx, sub_matches).await,
        Some(("limits", _)) => commands::show_limits(&ctx).await,
        Some(("limits-set", sub_matches)) => commands::set_limits(&ctx, sub_matches).await,
        Some(("path", _)) => commands::show_path(&ctx).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

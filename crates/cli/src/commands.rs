// FILE: crates/cli/src/commands.rs

use crate::store::{explain, IniStore};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::style;
use phpmanager_config::{Config, ConfigManager};
use phpmanager_core::{
    group_entries, Entry, GroupBy, LimitValue, RuntimeLimit, RuntimeLimitsEditor, SearchField,
    SearchFilter, SearchRequest, SearchState, Setting,
};


/// Everything a command needs: the php.ini on disk and the loaded config
pub struct CliContext {
    pub store: IniStore,
    pub config: Config,
}

/// List every setting, optionally grouped by section
pub async fn list_settings(ctx: &CliContext, matches: &ArgMatches) -> Result<()> {
    let session = ctx.store.open_session(&ctx.config.messages).await?;
    let file = session.snapshot();

    if file.is_empty() {
        println!("No settings in {}", ctx.store.path().display());
        return Ok(());
    }

    let group_by = if matches.get_flag("group") {
        GroupBy::Section
    } else if matches.get_flag("flat") {
        GroupBy::None
    } else {
        ctx.config.display.group_by()
    };

    println!(
        "\n{} settings in {}",
        style(file.len()).bold().cyan(),
        ctx.store.path().display()
    );
    println!("{}", "=".repeat(80));
    print!("{}", render_entries(file.entries(), group_by));

    Ok(())
}

/// List section names in first-seen order
pub async fn list_sections(ctx: &CliContext) -> Result<()> {
    let session = ctx.store.open_session(&ctx.config.messages).await?;
    let file = session.snapshot();

    for section in file.sections() {
        println!("[{}]", section);
    }
    Ok(())
}

/// Show the effective value of a setting
pub async fn get_setting(ctx: &CliContext, matches: &ArgMatches) -> Result<()> {
    let name = required(matches, "name")?;
    let session = ctx.store.open_session(&ctx.config.messages).await?;
    let file = session.snapshot();

    let entry = file
        .find_by_name(name)
        .ok_or_else(|| anyhow!("{} ({})", ctx.config.messages.not_found, name))?;
    println!("{}", entry.value());

    let shadowed = file.find_all_by_name(name).count() - 1;
    if shadowed > 0 {
        println!(
            "{} {} later duplicate(s) of {} are ignored",
            style("!").yellow().bold(),
            shadowed,
            name
        );
    }
    Ok(())
}

/// Add a setting or update the effective one
pub async fn set_setting(ctx: &CliContext, matches: &ArgMatches) -> Result<()> {
    let name = required(matches, "name")?;
    let value = required(matches, "value")?;
    let section = matches
        .get_one::<String>("section")
        .map(|s| s.as_str())
        .unwrap_or("");

    let session = ctx.store.open_for_write(&ctx.config.messages).await?;
    let snapshot = session.snapshot();
    let setting = resolve_target(snapshot.find_by_name(name), name, value, section);

    session
        .add_or_update_batch(vec![setting.clone()])
        .await
        .map_err(|e| explain(&ctx.config.messages, e))?;
    report_backup(ctx.store.persist(&session)?);

    println!("{} {}", style("✓").green().bold(), setting);
    Ok(())
}

/// Remove one occurrence of a setting
pub async fn remove_setting(ctx: &CliContext, matches: &ArgMatches) -> Result<()> {
    let name = required(matches, "name")?;
    let occurrence = matches.get_one::<usize>("occurrence").copied().unwrap_or(1);
    let force = matches.get_flag("force");

    let session = ctx.store.open_for_write(&ctx.config.messages).await?;
    let file = session.snapshot();
    let entry = nth_occurrence(file.find_all_by_name(name), occurrence).ok_or_else(|| {
        anyhow!(
            "{} ({} occurrence {})",
            ctx.config.messages.not_found,
            name,
            occurrence
        )
    })?;

    if !force && !confirm(&ctx.config.messages.confirm_delete_for(name))? {
        println!("Removal cancelled.");
        return Ok(());
    }

    let removed = session
        .remove(entry.id())
        .await
        .map_err(|e| explain(&ctx.config.messages, e))?;
    report_backup(ctx.store.persist(&session)?);

    println!("{} Removed {}", style("✓").green().bold(), removed);
    Ok(())
}

/// Show settings whose chosen field contains the text
pub async fn search_settings(ctx: &CliContext, matches: &ArgMatches) -> Result<()> {
    let text = required(matches, "text")?;
    let field = match matches.get_one::<String>("field") {
        Some(field) => field.parse::<SearchField>().map_err(|e| anyhow!(e))?,
        None => ctx.config.display.search_field,
    };

    let session = ctx.store.open_session(&ctx.config.messages).await?;
    let file = session.snapshot();

    let mut state = SearchState::default();
    state.apply(SearchRequest::Filter(SearchFilter::new(field, text)));
    let results: Vec<&Entry> = file.visible(&state).collect();

    if results.is_empty() {
        println!("No settings with {} matching '{}'", field, text);
        return Ok(());
    }

    println!(
        "\n{} settings with {} matching '{}'",
        style(results.len()).bold().cyan(),
        field,
        text
    );
    println!("{}", "=".repeat(80));
    print!("{}", render_entries(results, GroupBy::None));
    Ok(())
}

/// Show the six runtime limits
pub async fn show_limits(ctx: &CliContext) -> Result<()> {
    let session = ctx.store.open_session(&ctx.config.messages).await?;
    let editor = session.runtime_limits();

    println!("\n{}", style("Runtime Limits").bold().cyan());
    println!("{}", "=".repeat(80));
    print!("{}", render_limits(&editor));
    Ok(())
}

/// Set one or more runtime limits and save all six as one batch
pub async fn set_limits(ctx: &CliContext, matches: &ArgMatches) -> Result<()> {
    let assignments: Vec<&String> = matches
        .get_many::<String>("assignments")
        .map(|values| values.collect())
        .unwrap_or_default();
    if assignments.is_empty() {
        bail!("Expected at least one NAME=VALUE assignment");
    }

    let session = ctx.store.open_for_write(&ctx.config.messages).await?;
    let mut editor = session.runtime_limits();
    for assignment in assignments {
        let (limit, value) = parse_limit_assignment(assignment)?;
        editor
            .set(limit, &value)
            .map_err(|e| anyhow!(ctx.config.messages.describe(&e)))?;
    }

    if !editor.is_dirty() {
        println!("Runtime limits unchanged.");
        return Ok(());
    }

    for line in empty_limit_warnings(&editor) {
        println!("{} {}", style("!").yellow().bold(), line);
    }

    session
        .save_runtime_limits(&mut editor)
        .await
        .map_err(|e| explain(&ctx.config.messages, e))?;
    report_backup(ctx.store.persist(&session)?);

    println!("{} Runtime limits saved", style("✓").green().bold());
    print!("{}", render_limits(&editor));
    Ok(())
}

/// Show where php.ini lives
pub async fn show_path(ctx: &CliContext) -> Result<()> {
    if !ctx.store.exists() {
        println!(
            "{}",
            ctx.config
                .messages
                .missing_ini_for(&ctx.store.path().display().to_string())
        );
        return Ok(());
    }

    let session = ctx.store.open_session(&ctx.config.messages).await?;
    let path = session
        .physical_path()
        .await
        .map_err(|e| explain(&ctx.config.messages, e))?
        .unwrap_or_else(|| ctx.store.path().display().to_string());
    println!("{}", path);

    if ctx.store.is_read_only() {
        println!("{}", ctx.config.messages.read_only);
    }
    Ok(())
}

/// Write a default config file if none exists
pub fn config_init(manager: &ConfigManager) -> Result<()> {
    let created = manager
        .initialize()
        .context("Failed to write default config")?;
    if created {
        println!(
            "{} Config written to {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!("Config already exists at {}", manager.config_path().display());
    }
    Ok(())
}

/// Setting to push for `set`: an existing name keeps its section
pub(crate) fn resolve_target(
    existing: Option<&Entry>,
    name: &str,
    value: &str,
    section: &str,
) -> Setting {
    match existing {
        Some(entry) => {
            if !section.is_empty() && entry.section() != section {
                log::warn!(
                    "{} already exists in [{}]; updating it there",
                    name,
                    entry.section()
                );
            }
            Setting::new(name, value, entry.section())
        }
        None => Setting::new(name, value, section),
    }
}

/// 1-based occurrence of a name in file order
pub(crate) fn nth_occurrence<'a>(
    mut entries: impl Iterator<Item = &'a Entry>,
    occurrence: usize,
) -> Option<&'a Entry> {
    occurrence.checked_sub(1).and_then(|index| entries.nth(index))
}

/// Parses `memory_limit=256M` into a limit and its value
pub(crate) fn parse_limit_assignment(assignment: &str) -> Result<(RuntimeLimit, String)> {
    let (name, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got '{}'", assignment))?;
    let limit = RuntimeLimit::from_name(name.trim()).ok_or_else(|| {
        let known: Vec<&str> = RuntimeLimit::ALL.iter().map(|l| l.name()).collect();
        anyhow!(
            "Unknown runtime limit '{}'; expected one of: {}",
            name.trim(),
            known.join(", ")
        )
    })?;
    Ok((limit, value.trim().to_string()))
}

/// Limits the save will add with an empty value, which PHP reads as 0
pub(crate) fn empty_limit_warnings(editor: &RuntimeLimitsEditor) -> Vec<String> {
    editor
        .draft()
        .unset()
        .map(|limit| {
            format!(
                "{} is not set; it will be written empty, which PHP reads as 0",
                limit
            )
        })
        .collect()
}

/// Plain-text listing of entries
pub(crate) fn render_entries<'a>(
    entries: impl IntoIterator<Item = &'a Entry>,
    group_by: GroupBy,
) -> String {
    let grouped = group_entries(entries, group_by);
    let mut out = String::new();

    for entry in &grouped.ungrouped {
        out.push_str(&render_entry(entry, group_by == GroupBy::None));
    }
    for group in &grouped.groups {
        out.push_str(&format!("\n[{}]\n", group.name));
        for entry in &group.entries {
            out.push_str(&render_entry(entry, false));
        }
    }
    out
}

fn render_entry(entry: &Entry, with_section: bool) -> String {
    if with_section && !entry.section().is_empty() {
        format!(
            "  {} = {}  [{}]\n",
            entry.name(),
            entry.value(),
            entry.section()
        )
    } else {
        format!("  {} = {}\n", entry.name(), entry.value())
    }
}

/// Plain-text table of the runtime limits in the editor's draft
pub(crate) fn render_limits(editor: &RuntimeLimitsEditor) -> String {
    let mut out = String::new();
    for (limit, value) in editor.draft().iter() {
        let shown = match value {
            None => "(not set)".to_string(),
            Some(value) => match limit.parse_value(value) {
                Ok(parsed) => format!("{}{}", value, describe_limit(parsed)),
                Err(_) => format!("{} (unrecognised)", value),
            },
        };
        out.push_str(&format!("  {:<22}{}\n", limit.name(), shown));
    }
    out
}

fn describe_limit(value: LimitValue) -> String {
    match value {
        LimitValue::Unlimited => " (unlimited)".to_string(),
        LimitValue::Seconds(secs) => format!(" ({}s)", secs),
        LimitValue::Bytes(bytes) if bytes >= 1 << 20 => format!(" ({} MiB)", bytes >> 20),
        LimitValue::Bytes(bytes) => format!(" ({} bytes)", bytes),
        LimitValue::Count(_) => String::new(),
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("{} is required", id))
}

fn confirm(question: &str) -> Result<bool> {
    println!("{} (y/N)", question);
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn report_backup(backup: Option<std::path::PathBuf>) {
    if let Some(path) = backup {
        println!("  Previous version kept at {}", path.display());
    }
}

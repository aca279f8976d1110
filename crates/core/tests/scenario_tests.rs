//! End-to-end scenarios over the model, engine and runtime limits

use phpmanager_core::{
    ConfigService, IniError, IniFile, MemoryService, RawSetting, RemoteOperation, RemovalTarget,
    RuntimeLimit, RuntimeLimits, RuntimeLimitsEditor, SearchField, SearchFilter, SearchRequest,
    SearchState, ServiceError, Setting, SettingsEngine, RUNTIME_LIMITS_SECTION,
};
use std::sync::Mutex;

/// Service that serves fixed raw data and records every pushed batch
#[derive(Default)]
struct RecordingService {
    raw: Vec<RawSetting>,
    pushed: Mutex<Vec<Vec<Setting>>>,
    fail_push: bool,
}

impl RecordingService {
    fn new(raw: Vec<RawSetting>) -> Self {
        Self {
            raw,
            ..Self::default()
        }
    }

    fn pushed(&self) -> Vec<Vec<Setting>> {
        self.pushed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl ConfigService for RecordingService {
    fn fetch_settings(&self) -> Result<Vec<RawSetting>, ServiceError> {
        Ok(self.raw.clone())
    }

    fn push_settings(&self, batch: &[Setting]) -> Result<(), ServiceError> {
        if self.fail_push {
            return Err("server unavailable".into());
        }
        self.pushed
            .lock()
            .map_err(|_| "lock poisoned")?
            .push(batch.to_vec());
        Ok(())
    }

    fn remove_setting(&self, _target: &RemovalTarget) -> Result<(), ServiceError> {
        Ok(())
    }
}

fn scenario_raw() -> Vec<RawSetting> {
    vec![
        RawSetting::new("max_execution_time", "30", "PHP"),
        RawSetting::new("memory_limit", "128M", "PHP"),
        RawSetting::new("display_errors", "On", ""),
    ]
}

#[test]
fn test_runtime_limits_projection() -> Result<(), Box<dyn std::error::Error>> {
    let file = IniFile::from_raw(scenario_raw())?;
    let limits = RuntimeLimits::load(&file);

    assert_eq!(limits.slots()[0].as_deref(), Some("30"));
    assert_eq!(limits.slots()[2].as_deref(), Some("128M"));
    for index in [1, 3, 4, 5] {
        assert!(limits.slots()[index].is_none());
    }
    Ok(())
}

#[test]
fn test_runtime_limits_save_leaves_other_settings_alone() -> Result<(), Box<dyn std::error::Error>>
{
    let mut engine = SettingsEngine::load(RecordingService::new(scenario_raw()))?;
    let mut editor = RuntimeLimitsEditor::load(engine.file());
    editor.set(RuntimeLimit::UploadMaxFilesize, "32M")?;
    editor.save(&mut engine)?;

    let pushed = engine.service().pushed();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].len(), 6);
    assert!(pushed[0].iter().all(|s| s.section == RUNTIME_LIMITS_SECTION));
    assert!(pushed[0].iter().all(|s| s.name != "display_errors"));

    let display = engine.find_by_name("display_errors").ok_or("missing")?;
    assert_eq!(display.value(), "On");
    assert_eq!(display.section(), "");

    // every limit now exists, the previously absent ones appended at the end
    assert_eq!(engine.file().len(), 7);
    assert_eq!(
        engine.find_by_name("upload_max_filesize").map(|e| e.value()),
        Some("32M")
    );
    assert!(!editor.is_dirty());
    Ok(())
}

#[test]
fn test_runtime_limits_failed_save_keeps_draft() -> Result<(), Box<dyn std::error::Error>> {
    let service = RecordingService {
        fail_push: true,
        ..RecordingService::new(scenario_raw())
    };
    let mut engine = SettingsEngine::load(service)?;
    let mut editor = RuntimeLimitsEditor::load(engine.file());
    editor.set(RuntimeLimit::MemoryLimit, "512M")?;

    let err = editor.save(&mut engine).unwrap_err();
    assert!(matches!(err, IniError::RemoteOperationFailed { .. }));
    assert!(editor.is_dirty());
    assert_eq!(editor.draft().get(RuntimeLimit::MemoryLimit), Some("512M"));
    assert_eq!(editor.committed().get(RuntimeLimit::MemoryLimit), Some("128M"));
    assert_eq!(
        engine.find_by_name("memory_limit").map(|e| e.value()),
        Some("128M")
    );
    Ok(())
}

#[test]
fn test_value_filter_is_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
    let file = IniFile::from_raw(vec![
        RawSetting::new("a", "On", "s1"),
        RawSetting::new("b", "off", "s2"),
    ])?;
    let filter = SearchFilter::new(SearchField::Value, "on");
    let names: Vec<_> = file.filter(&filter).map(|e| e.name()).collect();
    assert_eq!(names, vec!["a"]);
    Ok(())
}

#[test]
fn test_filter_then_show_all_restores_sequence() -> Result<(), Box<dyn std::error::Error>> {
    let file = IniFile::from_raw(vec![
        RawSetting::new("z", "1", "B"),
        RawSetting::new("a", "2", "A"),
        RawSetting::new("m", "3", "B"),
    ])?;
    let full: Vec<_> = file.entries().iter().map(|e| e.id()).collect();

    let mut search = SearchState::default();
    search.apply(SearchRequest::Filter(SearchFilter::new(SearchField::Section, "b")));
    assert_eq!(file.visible(&search).count(), 2);

    search.apply(SearchRequest::ShowAll);
    let restored: Vec<_> = file.visible(&search).map(|e| e.id()).collect();
    assert_eq!(restored, full);
    Ok(())
}

#[test]
fn test_remove_one_duplicate_by_identity() -> Result<(), Box<dyn std::error::Error>> {
    let service = MemoryService::from_text("[s1]\nx = 1\n[s2]\nx = 2\n");
    let mut engine = SettingsEngine::load(service)?;

    let second = engine
        .file()
        .find_all_by_name("x")
        .nth(1)
        .ok_or("duplicate missing")?
        .id();
    engine.remove(second)?;

    let remaining: Vec<_> = engine.file().find_all_by_name("x").collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].value(), "1");
    assert_eq!(remaining[0].section(), "s1");
    assert_eq!(engine.service().text(), "[s1]\nx = 1\n[s2]\n");
    Ok(())
}

#[test]
fn test_failed_push_leaves_model_identical() -> Result<(), Box<dyn std::error::Error>> {
    let service = MemoryService::from_text("[PHP]\nengine = On\nshort_open_tag = Off\n");
    let mut engine = SettingsEngine::load(service)?;
    let before_raw = engine.file().to_raw();
    let before_text = engine.service().text();

    engine.service().fail_next(RemoteOperation::Push);
    let result = engine.add_or_update_batch(&[
        Setting::new("engine", "Off", "PHP"),
        Setting::new("memory_limit", "1G", "PHP"),
    ]);

    assert!(matches!(result, Err(IniError::RemoteOperationFailed { .. })));
    assert_eq!(engine.file().to_raw(), before_raw);
    assert_eq!(engine.service().text(), before_text);
    Ok(())
}

#[test]
fn test_failed_remove_leaves_model_identical() -> Result<(), Box<dyn std::error::Error>> {
    let service = MemoryService::from_text("a = 1\nb = 2\n");
    let mut engine = SettingsEngine::load(service)?;
    let before = engine.file().clone();
    let id = engine.find_by_name("b").ok_or("missing")?.id();

    engine.service().fail_next(RemoteOperation::Remove);
    assert!(engine.remove(id).is_err());
    assert_eq!(engine.file(), &before);
    Ok(())
}

#[test]
fn test_stale_removal_rejected_by_service() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = MemoryService::from_text("a = 1\nb = 2\n");
    let mut engine = SettingsEngine::load(service)?;
    let id = engine.find_by_name("b").ok_or("missing")?.id();

    // someone else changes "b" on the server; our copy of it is now stale
    engine.service().push_settings(&[Setting::new("b", "3", "")])?;

    let err = engine.remove(id).unwrap_err();
    assert!(matches!(err, IniError::RemoteOperationFailed { .. }));
    assert_eq!(engine.service().text(), "a = 1\nb = 3\n");
    assert!(engine.find_by_name("b").is_some());

    engine.refresh()?;
    let id = engine.find_by_name("b").ok_or("missing")?.id();
    engine.remove(id)?;
    assert_eq!(engine.service().text(), "a = 1\n");
    Ok(())
}

#[test]
fn test_remove_unaffected_by_unrelated_server_removal() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = MemoryService::from_text("a = 1\nb = 2\n");
    let mut engine = SettingsEngine::load(service)?;
    let id = engine.find_by_name("b").ok_or("missing")?.id();

    engine.service().remove_setting(&RemovalTarget {
        setting: Setting::new("a", "1", ""),
        occurrence: 0,
    })?;

    engine.remove(id)?;
    assert_eq!(engine.service().text(), "");
    Ok(())
}

#[test]
fn test_remove_after_add_into_earlier_section() -> Result<(), Box<dyn std::error::Error>> {
    let service = MemoryService::from_text("[PHP]\nengine = On\n\n[Session]\nsession.name = PHPSESSID\n");
    let mut engine = SettingsEngine::load(service)?;

    engine.add_or_update(Setting::new("memory_limit", "128M", "PHP"))?;
    let id = engine.find_by_name("session.name").ok_or("missing")?.id();
    let removed = engine.remove(id)?;

    assert_eq!(removed, Setting::new("session.name", "PHPSESSID", "Session"));
    assert!(engine.find_by_name("session.name").is_none());
    assert_eq!(
        engine.service().text(),
        "[PHP]\nengine = On\nmemory_limit = 128M\n\n[Session]\n"
    );
    Ok(())
}

#[test]
fn test_remove_duplicate_after_adds_elsewhere() -> Result<(), Box<dyn std::error::Error>> {
    let service = MemoryService::from_text("[PHP]\nextension = curl\n[Other]\nextension = curl\n[PHP]\nextension = curl\n");
    let mut engine = SettingsEngine::load(service)?;

    engine.add_or_update_batch(&[
        Setting::new("engine", "On", "PHP"),
        Setting::new("display_errors", "Off", ""),
    ])?;

    let last = engine
        .file()
        .find_all_by_name("extension")
        .nth(2)
        .ok_or("duplicate missing")?
        .id();
    engine.remove(last)?;

    assert_eq!(
        engine.service().text(),
        "display_errors = Off\n[PHP]\nextension = curl\nengine = On\n[Other]\nextension = curl\n[PHP]\n"
    );
    Ok(())
}

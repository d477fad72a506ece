use super::*;
use crate::preset::builtin::BUILTIN_PRESET_NAMES;

#[test]
fn builtins_are_registered_and_sorted() {
    let catalog = PresetCatalog::with_builtins().unwrap();
    assert_eq!(catalog.len(), BUILTIN_PRESET_NAMES.len());
    let names = catalog.list_names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    for name in BUILTIN_PRESET_NAMES {
        assert!(catalog.contains(name));
    }
    assert!(catalog.validate_all().is_empty());
}

#[test]
fn get_shares_the_same_allocation() {
    let catalog = PresetCatalog::with_builtins().unwrap();
    let a = catalog.get("neon").unwrap();
    let b = catalog.get(" neon ").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(catalog.get("nonexistent-preset").is_none());
}

#[test]
fn register_replaces_and_returns_previous() {
    let mut catalog = PresetCatalog::new();
    assert!(catalog.is_empty());
    assert!(catalog.register(Preset::new("a")).unwrap().is_none());
    let mut second = Preset::new("a");
    second.description = "second".into();
    let prev = catalog.register(second).unwrap().unwrap();
    assert_eq!(prev.description, "");
    assert_eq!(catalog.get("a").unwrap().description, "second");
}

#[test]
fn register_rejects_empty_name() {
    let mut catalog = PresetCatalog::new();
    assert!(matches!(
        catalog.register(Preset::new("")),
        Err(KinetypeError::Validation(_))
    ));
}

#[test]
fn register_stores_the_trimmed_name() {
    let mut catalog = PresetCatalog::new();
    catalog.register(Preset::new("  padded \t")).unwrap();
    assert_eq!(catalog.list_names(), vec!["padded"]);
    assert_eq!(catalog.get("padded").unwrap().name, "padded");
}

#[test]
fn load_json_accepts_single_and_array() {
    let mut catalog = PresetCatalog::new();
    let n = catalog
        .load_json_str(r#"{"name": "solo", "animations": {}}"#)
        .unwrap();
    assert_eq!(n, 1);
    let n = catalog
        .load_json_str(r#"[{"name": "one"}, {"name": "two"}]"#)
        .unwrap();
    assert_eq!(n, 2);
    assert_eq!(catalog.list_names(), vec!["one", "solo", "two"]);
}

#[test]
fn load_json_is_all_or_nothing() {
    let mut catalog = PresetCatalog::new();
    let err = catalog
        .load_json_str(r#"[{"name": "ok"}, {"name": ""}]"#)
        .unwrap_err();
    assert!(matches!(err, KinetypeError::Validation(_)));
    assert!(catalog.is_empty());

    assert!(matches!(
        catalog.load_json_str("{not json"),
        Err(KinetypeError::Serde(_))
    ));
}

#[test]
fn malformed_phases_are_reported_by_validate_all() {
    let mut catalog = PresetCatalog::new();
    catalog
        .load_json_str(r#"{"name": "broken", "animations": {"loop": {"duration": 1, "keyframes": []}}}"#)
        .unwrap();
    let errors = catalog.validate_all();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], KinetypeError::MalformedPreset { .. }));
}

#[test]
fn load_json_path_reports_missing_file() {
    let mut catalog = PresetCatalog::new();
    let err = catalog
        .load_json_path("/definitely/not/here/presets.json")
        .unwrap_err();
    assert!(err.to_string().contains("open preset JSON"));
}

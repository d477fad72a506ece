use super::*;
use crate::preset::model::PhaseName;

#[test]
fn every_builtin_parses_and_validates() {
    let presets = builtin_presets().unwrap();
    assert_eq!(presets.len(), BUILTIN_PRESET_NAMES.len());
    for (preset, name) in presets.iter().zip(BUILTIN_PRESET_NAMES) {
        assert_eq!(preset.name, name);
        assert!(!preset.description.is_empty());
        preset.validate().unwrap();
    }
}

#[test]
fn builtins_round_trip_through_json() {
    for preset in builtin_presets().unwrap() {
        let json = serde_json::to_string(&preset).unwrap();
        let back: Preset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }
}

#[test]
fn typewriter_preset_uses_typewriter_phases() {
    let presets = builtin_presets().unwrap();
    let tw = presets.iter().find(|p| p.name == "typewriter").unwrap();
    assert!(tw.animations[&PhaseName::Entrance].typewriter.is_some());
    assert!(tw.animations[&PhaseName::Exit].typewriter.is_some());
}

#[test]
fn unknown_builtin_is_none() {
    assert!(builtin_value("sparkle").is_none());
}

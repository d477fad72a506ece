use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::preset::builtin::builtin_presets;
use crate::preset::model::Preset;

/// Explicit registry of presets, keyed by name.
///
/// Presets are immutable once registered and handed out as `Arc<Preset>`, so several timelines can
/// share one definition. Registration checks the preset's identity and styles; phase animations are
/// checked when a timeline is built from them (see [`PresetCatalog::validate_all`] for an eager check).
#[derive(Clone, Debug, Default)]
pub struct PresetCatalog {
    presets: BTreeMap<String, Arc<Preset>>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum PresetFile {
    Many(Vec<Preset>),
    One(Box<Preset>),
}

impl PresetCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in preset.
    pub fn with_builtins() -> KinetypeResult<Self> {
        let mut catalog = Self::new();
        for preset in builtin_presets()? {
            catalog.register(preset)?;
        }
        Ok(catalog)
    }

    /// Add or replace a preset. Returns the preset previously registered under the same name.
    ///
    /// Surrounding whitespace is stripped from the name before it is stored.
    pub fn register(&mut self, mut preset: Preset) -> KinetypeResult<Option<Arc<Preset>>> {
        let name = preset.name.trim().to_owned();
        if name.is_empty() {
            return Err(KinetypeError::validation("preset name must be non-empty"));
        }
        if !preset.styles.font_size.is_finite() || preset.styles.font_size <= 0.0 {
            return Err(KinetypeError::validation(format!(
                "preset '{name}' fontSize must be > 0"
            )));
        }
        tracing::debug!(preset = %name, "register preset");
        preset.name.clone_from(&name);
        Ok(self.presets.insert(name, Arc::new(preset)))
    }

    /// Look up a preset by name.
    pub fn get(&self, name: &str) -> Option<Arc<Preset>> {
        self.presets.get(name.trim()).cloned()
    }

    /// Return `true` if a preset with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name.trim())
    }

    /// Registered names in sorted order.
    pub fn list_names(&self) -> Vec<String> {
        self.presets.keys().cloned().collect()
    }

    /// Number of registered presets.
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Return `true` if the catalog holds no presets.
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Register presets from JSON text holding one preset object or an array of them.
    ///
    /// Either every preset is registered or none is. Returns the number registered.
    pub fn load_json_str(&mut self, json: &str) -> KinetypeResult<usize> {
        let parsed: PresetFile = serde_json::from_str(json)
            .map_err(|e| KinetypeError::serde(format!("parse preset JSON: {e}")))?;
        self.register_all(parsed)
    }

    /// Register presets from a JSON file on disk.
    pub fn load_json_path(&mut self, path: impl AsRef<Path>) -> KinetypeResult<usize> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            KinetypeError::validation(format!("open preset JSON '{}': {e}", path.display()))
        })?;
        let parsed: PresetFile = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            KinetypeError::serde(format!("parse preset JSON '{}': {e}", path.display()))
        })?;
        self.register_all(parsed)
    }

    fn register_all(&mut self, parsed: PresetFile) -> KinetypeResult<usize> {
        let presets = match parsed {
            PresetFile::Many(v) => v,
            PresetFile::One(p) => vec![*p],
        };
        let mut staged = self.clone();
        for preset in presets.iter().cloned() {
            staged.register(preset)?;
        }
        *self = staged;
        Ok(presets.len())
    }

    /// Fully validate every registered preset, including phase animations.
    ///
    /// Returns the errors found, in name order.
    pub fn validate_all(&self) -> Vec<KinetypeError> {
        self.presets
            .values()
            .filter_map(|p| p.validate().err())
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preset/catalog.rs"]
mod tests;

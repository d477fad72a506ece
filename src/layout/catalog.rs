use std::collections::BTreeMap;
use std::sync::Arc;

use crate::animation::ease::{Ease, EaseDir};
use crate::animation::pose::{Keyframe, Property};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::layout::generator::{CharacterPosition, LayoutKind, LayoutOptions, calculate};
use crate::preset::model::{AnimationConfig, PhaseName, Stagger, TimeSpec};

/// Named layout: a placement algorithm plus optional phase animations it contributes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Registry key.
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Placement algorithm.
    #[serde(default)]
    pub kind: LayoutKind,
    /// Animations that override the preset's for the same phase.
    #[serde(default)]
    pub animations: BTreeMap<PhaseName, AnimationConfig>,
}

impl Layout {
    /// Layout with no contributed animations.
    pub fn new(name: impl Into<String>, kind: LayoutKind) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind,
            animations: BTreeMap::new(),
        }
    }

    /// Compute rest placements for `text`.
    pub fn calculate(
        &self,
        text: &str,
        opts: &LayoutOptions,
    ) -> KinetypeResult<Vec<CharacterPosition>> {
        calculate(text, self.kind, opts)
    }
}

/// Explicit registry of layouts.
#[derive(Clone, Debug, Default)]
pub struct LayoutCatalog {
    layouts: BTreeMap<String, Arc<Layout>>,
}

impl LayoutCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with `grid`, `spiral` and `radial`.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        let mut grid = Layout::new("grid", LayoutKind::Grid);
        grid.description = "Near-square grid centered on the canvas".into();
        let mut spiral = Layout::new("spiral", LayoutKind::Spiral);
        spiral.description = "Archimedean spiral growing outward".into();
        let mut radial = Layout::new("radial", LayoutKind::Radial);
        radial.description = "Ring of tangent-facing characters with an orbit sway".into();
        radial.animations.insert(PhaseName::Loop, orbit_sway());

        for layout in [grid, spiral, radial] {
            catalog.layouts.insert(layout.name.clone(), Arc::new(layout));
        }
        catalog
    }

    /// Add or replace a layout.
    pub fn register(&mut self, layout: Layout) -> KinetypeResult<Option<Arc<Layout>>> {
        let name = layout.name.trim().to_owned();
        if name.is_empty() {
            return Err(KinetypeError::validation("layout name must be non-empty"));
        }
        for (phase, anim) in &layout.animations {
            anim.validate(&name, *phase)?;
        }
        Ok(self.layouts.insert(name, Arc::new(layout)))
    }

    /// Look up a layout by exact name.
    pub fn get(&self, name: &str) -> Option<Arc<Layout>> {
        self.layouts.get(name.trim()).cloned()
    }

    /// Look up a layout, falling back to the algorithm named by `name` and then to `grid`.
    ///
    /// Unknown names are not an error. `None` is returned only for a catalog without a `grid`.
    pub fn resolve(&self, name: &str) -> Option<Arc<Layout>> {
        if let Some(layout) = self.get(name) {
            return Some(layout);
        }
        let kind = LayoutKind::from_name(name);
        if let Some(layout) = self.get(kind.name()) {
            if kind == LayoutKind::Grid && !name.trim().eq_ignore_ascii_case("grid") {
                tracing::warn!(layout = name, "unknown layout, using grid");
            }
            return Some(layout);
        }
        self.get(LayoutKind::Grid.name())
    }

    /// Registered names in sorted order.
    pub fn list_names(&self) -> Vec<String> {
        self.layouts.keys().cloned().collect()
    }
}

fn orbit_sway() -> AnimationConfig {
    let kf = |rotation: f64, y: f64| -> Keyframe {
        [(Property::Rotation, rotation), (Property::Y, y)]
            .into_iter()
            .collect()
    };
    let mut anim = AnimationConfig::new(3.0, vec![kf(-4.0, -6.0), kf(4.0, 6.0), kf(0.0, 0.0)]);
    anim.ease = Ease::Sine(EaseDir::InOut);
    anim.repeat = -1;
    anim.stagger = Some(Stagger::Each(TimeSpec::Seconds(0.1)));
    anim
}

#[cfg(test)]
#[path = "../../tests/unit/layout/catalog.rs"]
mod tests;

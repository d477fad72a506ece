use std::f64::consts::TAU;

use crate::foundation::error::{KinetypeError, KinetypeResult};

/// Rest placement of one input character.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CharacterPosition {
    /// The character.
    pub ch: char,
    /// Center x in canvas pixels.
    pub x: f64,
    /// Center y in canvas pixels.
    pub y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Uniform scale.
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Placement algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Near-square grid.
    #[default]
    Grid,
    /// Archimedean spiral.
    Spiral,
    /// Evenly spaced on a circle, tangent-facing.
    Radial,
}

impl LayoutKind {
    /// Resolve a layout name. Unknown names fall back to [`LayoutKind::Grid`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "grid" => Self::Grid,
            "spiral" => Self::Spiral,
            "radial" | "circle" => Self::Radial,
            other => {
                tracing::debug!(layout = other, "unknown layout type, falling back to grid");
                Self::Grid
            }
        }
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Spiral => "spiral",
            Self::Radial => "radial",
        }
    }
}

impl<'de> serde::Deserialize<'de> for LayoutKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_name(&s))
    }
}

/// Geometry options shared by all layout algorithms.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Layout center x.
    pub center_x: f64,
    /// Layout center y.
    pub center_y: f64,
    /// Grid cell pitch in pixels.
    pub spacing: f64,
    /// Spiral outer radius / radial circle radius in pixels.
    pub radius: f64,
    /// Spiral turns.
    pub turns: f64,
    /// Grid column override (`None` = near-square).
    pub columns: Option<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            center_x: 640.0,
            center_y: 360.0,
            spacing: 80.0,
            radius: 200.0,
            turns: 2.0,
            columns: None,
        }
    }
}

impl LayoutOptions {
    /// Options centered on `(x, y)` with default geometry.
    pub fn centered(x: f64, y: f64) -> Self {
        Self {
            center_x: x,
            center_y: y,
            ..Self::default()
        }
    }

    fn validate(&self) -> KinetypeResult<()> {
        let finite = [
            ("centerX", self.center_x),
            ("centerY", self.center_y),
            ("spacing", self.spacing),
            ("radius", self.radius),
            ("turns", self.turns),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(KinetypeError::layout(format!("{name} must be finite")));
            }
        }
        if self.spacing < 0.0 || self.radius < 0.0 || self.turns < 0.0 {
            return Err(KinetypeError::layout(
                "spacing, radius and turns must be >= 0",
            ));
        }
        if self.columns == Some(0) {
            return Err(KinetypeError::layout("columns must be > 0"));
        }
        Ok(())
    }
}

/// Compute one rest placement per character of `text`.
///
/// Pure and deterministic: identical inputs give bit-identical output. Empty text yields an empty
/// vector.
pub fn calculate(
    text: &str,
    kind: LayoutKind,
    opts: &LayoutOptions,
) -> KinetypeResult<Vec<CharacterPosition>> {
    opts.validate()?;
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    Ok(match kind {
        LayoutKind::Grid => grid(&chars, opts),
        LayoutKind::Spiral => spiral(&chars, opts),
        LayoutKind::Radial => radial(&chars, opts),
    })
}

fn grid(chars: &[char], opts: &LayoutOptions) -> Vec<CharacterPosition> {
    let n = chars.len();
    let cols = opts
        .columns
        .unwrap_or_else(|| (n as f64).sqrt().ceil() as usize)
        .max(1);
    let rows = n.div_ceil(cols);
    let half_w = (cols as f64 - 1.0) / 2.0;
    let half_h = (rows as f64 - 1.0) / 2.0;

    chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            CharacterPosition {
                ch,
                x: opts.center_x + (col - half_w) * opts.spacing,
                y: opts.center_y + (row - half_h) * opts.spacing,
                rotation: 0.0,
                scale: 1.0,
                opacity: 1.0,
            }
        })
        .collect()
}

fn spiral(chars: &[char], opts: &LayoutOptions) -> Vec<CharacterPosition> {
    let n = chars.len() as f64;
    chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let frac = i as f64 / n;
            let t = frac * opts.turns * TAU;
            let r = opts.radius * frac;
            CharacterPosition {
                ch,
                x: opts.center_x + t.cos() * r,
                y: opts.center_y + t.sin() * r,
                rotation: t.to_degrees().rem_euclid(360.0),
                scale: 1.0,
                opacity: 1.0,
            }
        })
        .collect()
}

fn radial(chars: &[char], opts: &LayoutOptions) -> Vec<CharacterPosition> {
    let n = chars.len() as f64;
    chars
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let angle = i as f64 / n * TAU;
            CharacterPosition {
                ch,
                x: opts.center_x + angle.cos() * opts.radius,
                y: opts.center_y + angle.sin() * opts.radius,
                rotation: angle.to_degrees() + 90.0,
                scale: 1.0,
                opacity: 1.0,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/generator.rs"]
mod tests;

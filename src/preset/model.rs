use std::collections::BTreeMap;
use std::fmt;

use crate::animation::ease::Ease;
use crate::animation::pose::Keyframe;
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::preset::color::StyleColor;

/// Canonical animation phase.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PhaseName {
    /// Reveal of the text.
    #[serde(alias = "enter", alias = "in")]
    Entrance,
    /// Idle animation between entrance and exit.
    #[serde(alias = "idle")]
    Loop,
    /// Hide of the text.
    #[serde(alias = "out")]
    Exit,
}

impl PhaseName {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entrance => "entrance",
            Self::Loop => "loop",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time value as written by a preset author: bare seconds or a string with a unit.
///
/// `0.5`, `"0.5s"` and `"500ms"` are the same duration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    /// Seconds.
    Seconds(f64),
    /// `"<n>ms"` or `"<n>s"`.
    Text(String),
}

impl TimeSpec {
    /// Duration in seconds. Rejects negative, non-finite and unparsable values.
    pub fn to_secs(&self) -> KinetypeResult<f64> {
        let secs = match self {
            Self::Seconds(s) => *s,
            Self::Text(raw) => {
                let s = raw.trim();
                let (num, scale) = if let Some(ms) = s.strip_suffix("ms") {
                    (ms, 1e-3)
                } else if let Some(sec) = s.strip_suffix('s') {
                    (sec, 1.0)
                } else {
                    (s, 1.0)
                };
                let v: f64 = num.trim().parse().map_err(|_| {
                    KinetypeError::validation(format!("invalid time value '{raw}'"))
                })?;
                v * scale
            }
        };
        if !secs.is_finite() || secs < 0.0 {
            return Err(KinetypeError::validation(format!(
                "time value must be finite and >= 0, got {secs}"
            )));
        }
        Ok(secs)
    }
}

impl From<f64> for TimeSpec {
    fn from(secs: f64) -> Self {
        Self::Seconds(secs)
    }
}

impl Default for TimeSpec {
    fn default() -> Self {
        Self::Seconds(1.0)
    }
}

/// Which character starts a staggered phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaggerOrigin {
    /// First character first.
    #[default]
    Start,
    /// Last character first.
    End,
    /// Middle characters first.
    Center,
    /// Outermost characters first.
    Edges,
    /// Deterministically shuffled order.
    Random,
}

/// Per-character time offset rule.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Stagger {
    /// Offset between consecutive characters, starting from the first.
    Each(TimeSpec),
    /// Full form.
    Spec {
        /// Offset per unit of distance from the origin.
        #[serde(default)]
        each: Option<TimeSpec>,
        /// Total spread across all characters (alternative to `each`).
        #[serde(default)]
        amount: Option<TimeSpec>,
        /// Origin rule.
        #[serde(default)]
        from: StaggerOrigin,
    },
}

impl Stagger {
    /// Origin of this stagger rule.
    pub fn origin(&self) -> StaggerOrigin {
        match self {
            Self::Each(_) => StaggerOrigin::Start,
            Self::Spec { from, .. } => *from,
        }
    }
}

/// Character-by-character reveal keyed to a rate instead of a keyframe tween.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypewriterConfig {
    /// Characters per second.
    pub speed: f64,
}

/// One animation phase as authored in a preset.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Duration of one pass through the keyframes.
    #[serde(default)]
    pub duration: TimeSpec,
    /// Easing curve applied to each keyframe segment.
    #[serde(default)]
    pub ease: Ease,
    /// Extra repetitions; `-1` repeats forever.
    #[serde(default)]
    pub repeat: i32,
    /// Play forward then backward as one repeat unit.
    #[serde(default)]
    pub yoyo: bool,
    /// Per-character offset rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stagger: Option<Stagger>,
    /// Ordered property maps.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    /// Pause between repetitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_delay: Option<TimeSpec>,
    /// Typewriter reveal; replaces the keyframe tween when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typewriter: Option<TypewriterConfig>,
}

impl AnimationConfig {
    /// Phase with the given duration (seconds) and keyframes, default ease and no repeats.
    pub fn new(duration_secs: f64, keyframes: Vec<Keyframe>) -> Self {
        Self {
            duration: TimeSpec::Seconds(duration_secs),
            ease: Ease::default(),
            repeat: 0,
            yoyo: false,
            stagger: None,
            keyframes,
            repeat_delay: None,
            typewriter: None,
        }
    }

    /// Typewriter phase revealing `speed` characters per second.
    pub fn typewriter(speed: f64) -> Self {
        Self {
            typewriter: Some(TypewriterConfig { speed }),
            ..Self::new(0.0, Vec::new())
        }
    }

    /// Return `true` when the phase never terminates on its own.
    pub fn is_infinite(&self) -> bool {
        self.repeat < 0
    }

    /// Check the phase can be compiled. `preset` and `phase` only label the error.
    pub fn validate(&self, preset: &str, phase: PhaseName) -> KinetypeResult<()> {
        let malformed =
            |reason: String| KinetypeError::malformed_preset(preset, phase.as_str(), reason);

        if let Some(tw) = self.typewriter {
            if !tw.speed.is_finite() || tw.speed <= 0.0 {
                return Err(malformed(format!(
                    "typewriter speed must be > 0, got {}",
                    tw.speed
                )));
            }
            if phase == PhaseName::Loop {
                return Err(malformed("typewriter is only valid for entrance/exit".into()));
            }
            return Ok(());
        }
        if self.keyframes.is_empty() {
            return Err(malformed("phase has zero keyframes".into()));
        }
        if self.repeat < -1 {
            return Err(malformed(format!("repeat must be >= -1, got {}", self.repeat)));
        }
        if self.is_infinite() && phase != PhaseName::Loop {
            return Err(malformed(
                "only the loop phase may repeat forever".into(),
            ));
        }
        for v in self.keyframes.iter().flat_map(|kf| kf.values()) {
            if !v.is_finite() {
                return Err(malformed("keyframe values must be finite".into()));
            }
        }
        self.duration
            .to_secs()
            .map_err(|e| malformed(e.to_string()))?;
        if let Some(d) = &self.repeat_delay {
            d.to_secs().map_err(|e| malformed(e.to_string()))?;
        }
        if let Some(Stagger::Each(t)) = &self.stagger {
            t.to_secs().map_err(|e| malformed(e.to_string()))?;
        }
        if let Some(Stagger::Spec { each, amount, .. }) = &self.stagger {
            for t in [each, amount].into_iter().flatten() {
                t.to_secs().map_err(|e| malformed(e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// Visual style applied uniformly to every character.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PresetStyles {
    /// Font size in pixels.
    pub font_size: f64,
    /// Base font weight.
    pub font_weight: f64,
    /// Preferred font family (informational for surfaces without font lookup).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Glyph fill color.
    pub color: StyleColor,
    /// Canvas background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<StyleColor>,
    /// CSS-like text shadow, carried as data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_shadow: Option<String>,
    /// CSS-like filter, carried as data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// CSS-like variation settings, carried as data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_variation_settings: Option<String>,
}

impl Default for PresetStyles {
    fn default() -> Self {
        Self {
            font_size: 72.0,
            font_weight: 400.0,
            font_family: None,
            color: StyleColor::white(),
            background: None,
            text_shadow: None,
            filter: None,
            font_variation_settings: None,
        }
    }
}

/// Decorative particle emitter description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleConfig {
    /// Number of live particles.
    pub count: u32,
    /// Palette; particles pick colors deterministically.
    pub colors: Vec<StyleColor>,
    /// Size range in pixels.
    pub size: [f64; 2],
    /// Initial speed range in pixels per second.
    pub velocity: [f64; 2],
    /// Downward acceleration in pixels per second squared (negative rises).
    pub gravity: f64,
    /// Particle lifetime in seconds; particles respawn when it elapses.
    pub lifetime: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 40,
            colors: vec![StyleColor::white()],
            size: [2.0, 5.0],
            velocity: [20.0, 80.0],
            gravity: 0.0,
            lifetime: 2.0,
        }
    }
}

/// Named, immutable configuration bundle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    /// Registry key.
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Visual style.
    #[serde(default)]
    pub styles: PresetStyles,
    /// Phase animations.
    #[serde(default)]
    pub animations: BTreeMap<PhaseName, AnimationConfig>,
    /// Optional decorative particles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<ParticleConfig>,
}

impl Preset {
    /// Empty preset with default styles.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            styles: PresetStyles::default(),
            animations: BTreeMap::new(),
            particles: None,
        }
    }

    /// Builder-style phase insertion.
    pub fn with_phase(mut self, phase: PhaseName, anim: AnimationConfig) -> Self {
        self.animations.insert(phase, anim);
        self
    }

    /// Check every phase and the styles.
    pub fn validate(&self) -> KinetypeResult<()> {
        if self.name.trim().is_empty() {
            return Err(KinetypeError::validation("preset name must be non-empty"));
        }
        if !self.styles.font_size.is_finite() || self.styles.font_size <= 0.0 {
            return Err(KinetypeError::validation(format!(
                "preset '{}' fontSize must be > 0",
                self.name
            )));
        }
        for (phase, anim) in &self.animations {
            anim.validate(&self.name, *phase)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preset/model.rs"]
mod tests;

//! Ad-hoc presets assembled from effect keywords for the simple text mode.

use crate::animation::ease::{Ease, EaseDir};
use crate::animation::pose::{Keyframe, Property};
use crate::preset::color::StyleColor;
use crate::preset::model::{AnimationConfig, PhaseName, Preset, PresetStyles, Stagger, TimeSpec};

/// Name given to presets built by [`keyword_preset`].
pub const KEYWORD_PRESET_NAME: &str = "text-effect";

/// Entrance or exit effect keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealEffect {
    /// Opacity only.
    #[default]
    Fade,
    /// Opacity plus vertical travel.
    Slide,
    /// Opacity plus scale from zero.
    Scale,
    /// Character-by-character reveal.
    Typewriter,
}

/// Idle effect keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopEffect {
    /// Breathing scale.
    #[default]
    Pulse,
    /// Side-to-side rotation.
    Tilt,
    /// Continuous hue cycle.
    Hue,
    /// No idle animation.
    None,
}

/// Color theme keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a light background.
    Light,
    /// Light text on a dark background.
    #[default]
    Dark,
    /// Saturated pink on deep purple.
    Nightcore,
}

impl Theme {
    /// `(text color, background)` for this theme.
    pub fn colors(self) -> (StyleColor, StyleColor) {
        let pick = |fg: &str, bg: &str| {
            (
                StyleColor::from_hex(fg).unwrap_or_else(|_| StyleColor::white()),
                StyleColor::from_hex(bg).unwrap_or_else(|_| StyleColor::rgba(0.0, 0.0, 0.0, 1.0)),
            )
        };
        match self {
            Self::Light => pick("#111111", "#f5f5f5"),
            Self::Dark => pick("#f5f5f5", "#111111"),
            Self::Nightcore => pick("#ff4fd8", "#1a0033"),
        }
    }
}

/// Options for the keyword-driven simple text mode.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextEffectOptions {
    /// Entrance effect.
    pub entrance: RevealEffect,
    /// Idle effect.
    #[serde(rename = "loop")]
    pub loop_effect: LoopEffect,
    /// Exit effect.
    pub exit: RevealEffect,
    /// Font family hint.
    pub font_family: Option<String>,
    /// Font size in pixels.
    pub font_size: f64,
    /// Color theme.
    pub theme: Theme,
    /// Repeat entrance, loop and exit forever when `true`.
    ///
    /// When `false` the text plays a single cycle and finishes: entrance, a hold-length loop,
    /// then exit. It does not map to continuous mode, where an infinite loop never exits.
    pub loop_enabled: bool,
    /// Entrance duration in seconds.
    pub entrance_duration: f64,
    /// One idle cycle in seconds.
    pub loop_duration: f64,
    /// Exit duration in seconds.
    pub exit_duration: f64,
    /// Time spent in the idle phase per cycle; engine default when `None`.
    pub hold_duration: Option<f64>,
    /// Characters per second for typewriter entrance/exit.
    pub typewriter_speed: f64,
}

impl Default for TextEffectOptions {
    fn default() -> Self {
        Self {
            entrance: RevealEffect::Fade,
            loop_effect: LoopEffect::Pulse,
            exit: RevealEffect::Fade,
            font_family: None,
            font_size: 72.0,
            theme: Theme::Dark,
            loop_enabled: true,
            entrance_duration: 0.8,
            loop_duration: 1.5,
            exit_duration: 0.6,
            hold_duration: None,
            typewriter_speed: 14.0,
        }
    }
}

fn keyframe(props: &[(Property, f64)]) -> Keyframe {
    props.iter().copied().collect()
}

fn reveal(effect: RevealEffect, duration: f64, speed: f64, leaving: bool) -> AnimationConfig {
    let travel = if leaving { -40.0 } else { 40.0 };
    let kf = match effect {
        RevealEffect::Typewriter => return AnimationConfig::typewriter(speed),
        RevealEffect::Fade => keyframe(&[(Property::Opacity, 0.0)]),
        RevealEffect::Slide => keyframe(&[(Property::Opacity, 0.0), (Property::Y, travel)]),
        RevealEffect::Scale => keyframe(&[(Property::Opacity, 0.0), (Property::Scale, 0.0)]),
    };
    let mut anim = AnimationConfig::new(duration, vec![kf]);
    anim.ease = if leaving {
        Ease::Power {
            degree: 2,
            dir: EaseDir::In,
        }
    } else {
        Ease::Power {
            degree: 2,
            dir: EaseDir::Out,
        }
    };
    anim.stagger = Some(Stagger::Each(TimeSpec::Seconds(0.04)));
    anim
}

fn idle(effect: LoopEffect, duration: f64) -> Option<AnimationConfig> {
    let (keyframes, ease, yoyo) = match effect {
        LoopEffect::None => return None,
        LoopEffect::Pulse => (
            vec![keyframe(&[(Property::Scale, 1.08)])],
            Ease::Sine(EaseDir::InOut),
            true,
        ),
        LoopEffect::Tilt => (
            vec![
                keyframe(&[(Property::Rotation, -6.0)]),
                keyframe(&[(Property::Rotation, 6.0)]),
                keyframe(&[(Property::Rotation, 0.0)]),
            ],
            Ease::Sine(EaseDir::InOut),
            false,
        ),
        LoopEffect::Hue => (
            vec![keyframe(&[(Property::HueRotate, 360.0)])],
            Ease::Linear,
            false,
        ),
    };
    let mut anim = AnimationConfig::new(duration, keyframes);
    anim.ease = ease;
    anim.yoyo = yoyo;
    anim.repeat = -1;
    Some(anim)
}

/// Build the preset described by `opts`.
pub fn keyword_preset(opts: &TextEffectOptions) -> Preset {
    let (color, background) = opts.theme.colors();
    let styles = PresetStyles {
        font_size: opts.font_size,
        font_family: opts.font_family.clone(),
        color,
        background: Some(background),
        ..PresetStyles::default()
    };

    let mut preset = Preset::new(KEYWORD_PRESET_NAME);
    preset.description = format!(
        "{:?} / {:?} / {:?} on {:?}",
        opts.entrance, opts.loop_effect, opts.exit, opts.theme
    )
    .to_ascii_lowercase();
    preset.styles = styles;
    preset = preset
        .with_phase(
            PhaseName::Entrance,
            reveal(opts.entrance, opts.entrance_duration, opts.typewriter_speed, false),
        )
        .with_phase(
            PhaseName::Exit,
            reveal(opts.exit, opts.exit_duration, opts.typewriter_speed, true),
        );
    if let Some(anim) = idle(opts.loop_effect, opts.loop_duration) {
        preset = preset.with_phase(PhaseName::Loop, anim);
    }
    preset
}

#[cfg(test)]
#[path = "../../tests/unit/preset/keyword.rs"]
mod tests;

use std::collections::BTreeMap;

use crate::animation::pose::Pose;
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::Fnv1a64;
use crate::layout::generator::CharacterPosition;
use crate::preset::model::{AnimationConfig, PhaseName, Preset};
use crate::timeline::machine::{PlaybackMode, Schedule, Timeline};
use crate::timeline::phase::{PhaseMotion, RepeatCount, ResolvedPhase, Tween};

/// Playback knobs applied while compiling a preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineSettings {
    /// How the loop and the cycle end interact.
    pub mode: PlaybackMode,
    /// Loop length in cycle modes, in seconds.
    pub hold_secs: f64,
    /// Pause between cycles in cycling mode, in seconds.
    pub inter_cycle_delay_secs: f64,
    /// Collapse motion to near-instant reveals.
    pub reduced_motion: bool,
    /// Seed for random stagger order.
    pub seed: u64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::SingleCycle,
            hold_secs: 4.0,
            inter_cycle_delay_secs: 1.0,
            reduced_motion: false,
            seed: 0,
        }
    }
}

impl TimelineSettings {
    fn validate(&self) -> KinetypeResult<()> {
        if !self.hold_secs.is_finite() || self.hold_secs < 0.0 {
            return Err(KinetypeError::validation(format!(
                "hold must be finite and >= 0, got {}",
                self.hold_secs
            )));
        }
        if !self.inter_cycle_delay_secs.is_finite() || self.inter_cycle_delay_secs < 0.0 {
            return Err(KinetypeError::validation(format!(
                "inter-cycle delay must be finite and >= 0, got {}",
                self.inter_cycle_delay_secs
            )));
        }
        Ok(())
    }
}

/// Compiles a preset (plus layout and caller overrides) into a [`Timeline`].
///
/// Per phase, custom animations win over layout animations, which win over the preset's own.
/// A phase nobody defines holds the rest pose.
#[derive(Clone, Debug)]
pub struct TimelineBuilder<'a> {
    preset: &'a Preset,
    layout_animations: Option<&'a BTreeMap<PhaseName, AnimationConfig>>,
    custom_animations: Option<&'a BTreeMap<PhaseName, AnimationConfig>>,
    settings: TimelineSettings,
}

impl<'a> TimelineBuilder<'a> {
    /// Builder for `preset`.
    pub fn new(preset: &'a Preset, settings: TimelineSettings) -> Self {
        Self {
            preset,
            layout_animations: None,
            custom_animations: None,
            settings,
        }
    }

    /// Animations contributed by the chosen layout.
    pub fn layout_animations(mut self, animations: &'a BTreeMap<PhaseName, AnimationConfig>) -> Self {
        self.layout_animations = Some(animations);
        self
    }

    /// Caller-supplied overrides.
    pub fn custom_animations(mut self, animations: &'a BTreeMap<PhaseName, AnimationConfig>) -> Self {
        self.custom_animations = Some(animations);
        self
    }

    fn animation_for(&self, phase: PhaseName) -> Option<&'a AnimationConfig> {
        self.custom_animations
            .and_then(|a| a.get(&phase))
            .or_else(|| self.layout_animations.and_then(|a| a.get(&phase)))
            .or_else(|| self.preset.animations.get(&phase))
    }

    fn resolve(
        &self,
        phase: PhaseName,
        n: usize,
        base: &Pose,
        reduced_motion: bool,
    ) -> KinetypeResult<ResolvedPhase> {
        match self.animation_for(phase) {
            Some(anim) => ResolvedPhase::resolve(
                phase,
                anim,
                &self.preset.name,
                n,
                base,
                phase_seed(self.settings.seed, phase),
                reduced_motion,
            ),
            None => Ok(ResolvedPhase::fixed(phase, n)),
        }
    }

    /// Compile for the given rest placements.
    ///
    /// Fails fast with [`KinetypeError::MalformedPreset`] on the first phase that cannot be
    /// compiled.
    #[tracing::instrument(skip(self, positions), fields(preset = %self.preset.name, chars = positions.len()))]
    pub fn build(&self, positions: Vec<CharacterPosition>) -> KinetypeResult<Timeline> {
        self.settings.validate()?;
        let s = self.settings;
        let n = positions.len();
        let base = Pose::rest(self.preset.styles.font_weight);

        let entrance = self.resolve(PhaseName::Entrance, n, &base, s.reduced_motion)?;
        let exit = self.resolve(PhaseName::Exit, n, &base, s.reduced_motion)?;
        // Compiled at full motion even when reduced, to learn whether it terminates.
        let mut looping = self.resolve(PhaseName::Loop, n, &base, false)?;

        let cycle_mode = s.mode != PlaybackMode::Continuous;
        let (loop_secs, loop_iterations) = if s.reduced_motion {
            let infinite = looping.is_infinite();
            looping = ResolvedPhase::fixed(PhaseName::Loop, n);
            match (cycle_mode, infinite) {
                (true, _) => (Some(s.hold_secs), None),
                (false, true) => (None, None),
                (false, false) => (Some(0.0), None),
            }
        } else if cycle_mode {
            let iterations = match &looping.motion {
                PhaseMotion::Tween(tween) => {
                    let last_start = looping.delays.iter().copied().fold(0.0, f64::max);
                    Some(hold_iterations(tween, s.hold_secs - last_start))
                }
                PhaseMotion::Typewriter { .. } | PhaseMotion::Static => None,
            };
            (Some(s.hold_secs), iterations)
        } else {
            (looping.natural_secs(), None)
        };

        let schedule = Schedule {
            mode: s.mode,
            entrance_secs: entrance.natural_secs().unwrap_or(0.0),
            loop_secs,
            loop_iterations,
            exit_secs: exit.natural_secs().unwrap_or(0.0),
            inter_cycle_delay_secs: s.inter_cycle_delay_secs,
        };
        tracing::debug!(
            entrance = schedule.entrance_secs,
            looping = ?schedule.loop_secs,
            exit = schedule.exit_secs,
            iterations = ?schedule.loop_iterations,
            "timeline compiled"
        );
        Ok(Timeline::from_parts(
            positions,
            base,
            [entrance, looping, exit],
            schedule,
        ))
    }
}

/// Whole loop units that every character, including the most delayed one, finishes
/// inside the hold. The remainder stays unfilled.
fn hold_iterations(tween: &Tween, window_secs: f64) -> u64 {
    let unit = tween.unit_secs();
    if unit <= 0.0 || window_secs <= 0.0 {
        return 0;
    }
    let fits = (window_secs / unit).floor() as u64;
    match tween.repeat {
        RepeatCount::Finite(r) => fits.min(u64::from(r) + 1),
        RepeatCount::Infinite => fits,
    }
}

fn phase_seed(seed: u64, phase: PhaseName) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u64(phase as u64);
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;

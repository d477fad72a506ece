use crate::animation::ease::Ease;
use crate::animation::pose::{Keyframe, Lerp, Pose};
use crate::foundation::error::KinetypeResult;
use crate::preset::model::{AnimationConfig, PhaseName};
use crate::timeline::stagger::stagger_delays;

/// Longest entrance/exit pass allowed when reduced motion is active, in seconds.
pub const REDUCED_MOTION_MAX_SECS: f64 = 0.1;

/// How many times a tween plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatCount {
    /// Plays once plus this many repeats.
    Finite(u32),
    /// Never stops on its own.
    Infinite,
}

impl RepeatCount {
    fn from_repeat(repeat: i32) -> Self {
        if repeat < 0 {
            Self::Infinite
        } else {
            Self::Finite(repeat.unsigned_abs())
        }
    }
}

/// Keyframe tween compiled to absolute poses with durations in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    /// Poses visited in order; segments share the duration evenly.
    pub path: Vec<Pose>,
    /// One forward pass through `path`.
    pub duration: f64,
    /// Ease applied to every segment.
    pub ease: Ease,
    /// Play forward then backward as one unit.
    pub yoyo: bool,
    /// Repetition rule.
    pub repeat: RepeatCount,
    /// Pause after every unit except the last.
    pub repeat_delay: f64,
}

impl Tween {
    /// One unit of motion (`duration`, doubled by yoyo).
    pub fn cycle_secs(&self) -> f64 {
        if self.yoyo {
            self.duration * 2.0
        } else {
            self.duration
        }
    }

    /// One unit of motion plus its repeat delay.
    pub fn unit_secs(&self) -> f64 {
        self.cycle_secs() + self.repeat_delay
    }

    /// Time from start until the tween stops, or `None` if it never does.
    pub fn active_secs(&self) -> Option<f64> {
        match self.repeat {
            RepeatCount::Infinite => None,
            RepeatCount::Finite(r) => {
                let r = f64::from(r);
                Some((r + 1.0) * self.cycle_secs() + r * self.repeat_delay)
            }
        }
    }

    fn start_pose(&self) -> Pose {
        self.path[0]
    }

    fn end_pose(&self) -> Pose {
        if self.yoyo {
            self.path[0]
        } else {
            self.path[self.path.len() - 1]
        }
    }

    /// Pose at normalized progress `p` through the path.
    pub fn pose_at_progress(&self, p: f64) -> Pose {
        let segments = self.path.len() - 1;
        if segments == 0 {
            return self.path[0];
        }
        let s = p.clamp(0.0, 1.0) * segments as f64;
        let seg = (s.floor() as usize).min(segments - 1);
        let local = s - seg as f64;
        Pose::lerp(&self.path[seg], &self.path[seg + 1], self.ease.apply(local))
    }

    /// Pose `local` seconds after this character's start.
    ///
    /// `max_units` cuts a longer tween after that many units; the character then rests at the
    /// start pose. A tween that finishes naturally rests at its end pose.
    pub fn sample(&self, local: f64, max_units: Option<u64>) -> Pose {
        if local < 0.0 {
            return self.start_pose();
        }
        let cycle = self.cycle_secs();
        let unit = self.unit_secs();
        if let Some(active) = self.active_secs()
            && local >= active
        {
            return self.end_pose();
        }
        if let Some(max) = max_units
            && (max == 0 || unit <= 0.0 || local >= max as f64 * unit)
        {
            return self.start_pose();
        }
        if cycle <= 0.0 {
            return self.end_pose();
        }

        let k = if unit > 0.0 { (local / unit).floor() } else { 0.0 };
        let within = local - k * unit;
        if within >= cycle {
            return self.end_pose();
        }
        let p = if self.yoyo && within >= self.duration {
            1.0 - (within - self.duration) / self.duration
        } else {
            within / self.duration
        };
        self.pose_at_progress(p)
    }
}

/// What a phase does to each character.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseMotion {
    /// Keyframe tween.
    Tween(Tween),
    /// Character-by-character reveal (`hide = false`) or reverse hide (`hide = true`).
    Typewriter {
        /// Characters per second.
        speed: f64,
        /// Hide instead of reveal.
        hide: bool,
    },
    /// Characters hold their rest pose.
    Static,
}

/// A phase compiled for a fixed character count.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPhase {
    /// Canonical phase.
    pub name: PhaseName,
    /// Motion rule.
    pub motion: PhaseMotion,
    /// Per-character start delays in seconds.
    pub delays: Vec<f64>,
}

impl ResolvedPhase {
    /// Phase holding the rest pose for `n` characters.
    pub fn fixed(name: PhaseName, n: usize) -> Self {
        Self {
            name,
            motion: PhaseMotion::Static,
            delays: vec![0.0; n],
        }
    }

    /// Compile `anim` for `n` characters resting at `base`.
    ///
    /// Durations are converted to seconds here and nowhere else. With `reduced_motion`, the pass is
    /// capped at [`REDUCED_MOTION_MAX_SECS`], repeats are dropped and stagger collapses to zero.
    pub fn resolve(
        name: PhaseName,
        anim: &AnimationConfig,
        preset: &str,
        n: usize,
        base: &Pose,
        seed: u64,
        reduced_motion: bool,
    ) -> KinetypeResult<Self> {
        anim.validate(preset, name)?;

        if let Some(tw) = anim.typewriter {
            let mut speed = tw.speed;
            if reduced_motion && n > 0 {
                speed = speed.max(n as f64 / REDUCED_MOTION_MAX_SECS);
            }
            return Ok(Self {
                name,
                motion: PhaseMotion::Typewriter {
                    speed,
                    hide: name == PhaseName::Exit,
                },
                delays: vec![0.0; n],
            });
        }

        let mut tween = Tween {
            path: build_path(&anim.keyframes, base, name),
            duration: anim.duration.to_secs()?,
            ease: anim.ease,
            yoyo: anim.yoyo,
            repeat: RepeatCount::from_repeat(anim.repeat),
            repeat_delay: match &anim.repeat_delay {
                Some(d) => d.to_secs()?,
                None => 0.0,
            },
        };
        let delays = if reduced_motion {
            let cap = if tween.yoyo {
                REDUCED_MOTION_MAX_SECS / 2.0
            } else {
                REDUCED_MOTION_MAX_SECS
            };
            tween.duration = tween.duration.min(cap);
            tween.repeat = RepeatCount::Finite(0);
            tween.repeat_delay = 0.0;
            vec![0.0; n]
        } else {
            stagger_delays(anim.stagger.as_ref(), n, seed)?
        };

        Ok(Self {
            name,
            motion: PhaseMotion::Tween(tween),
            delays,
        })
    }

    /// Time until the last character finishes, or `None` for a non-terminating phase.
    pub fn natural_secs(&self) -> Option<f64> {
        let n = self.delays.len();
        match &self.motion {
            PhaseMotion::Static => Some(0.0),
            PhaseMotion::Typewriter { speed, .. } => Some(n as f64 / speed),
            PhaseMotion::Tween(tween) => {
                let max_delay = self.delays.iter().copied().fold(0.0_f64, f64::max);
                tween.active_secs().map(|a| max_delay + a)
            }
        }
    }

    /// Return `true` when the phase never finishes on its own.
    pub fn is_infinite(&self) -> bool {
        self.natural_secs().is_none()
    }

    /// Pose of character `index` at `t` seconds into the phase.
    pub fn pose_at(&self, index: usize, t: f64, base: &Pose, max_units: Option<u64>) -> Pose {
        let n = self.delays.len();
        match &self.motion {
            PhaseMotion::Static => *base,
            PhaseMotion::Typewriter { speed, hide } => {
                let visible = if *hide {
                    t < n.saturating_sub(index) as f64 / speed
                } else {
                    t >= (index + 1) as f64 / speed
                };
                let mut pose = *base;
                pose.opacity = if visible { 1.0 } else { 0.0 };
                pose
            }
            PhaseMotion::Tween(tween) => {
                let delay = self.delays.get(index).copied().unwrap_or(0.0);
                tween.sample(t - delay, max_units)
            }
        }
    }
}

/// Poses visited by a phase.
///
/// Each keyframe inherits unspecified properties from the pose before it. Entrance keyframes lead
/// into the rest pose; loop and exit keyframes lead away from it.
fn build_path(keyframes: &[Keyframe], base: &Pose, name: PhaseName) -> Vec<Pose> {
    let mut poses = Vec::with_capacity(keyframes.len() + 1);
    let mut prev = *base;
    for kf in keyframes {
        prev = prev.with_keyframe(kf);
        poses.push(prev);
    }
    if name == PhaseName::Entrance {
        poses.push(*base);
        poses
    } else {
        let mut path = Vec::with_capacity(poses.len() + 1);
        path.push(*base);
        path.extend(poses);
        path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/phase.rs"]
mod tests;

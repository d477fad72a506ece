use crate::animation::pose::Pose;
use crate::layout::generator::CharacterPosition;
use crate::preset::model::PhaseName;
use crate::stage::surface::{AnimationTarget, CharTransform, FilterParams, compose_opacity};
use crate::timeline::phase::ResolvedPhase;

/// How the loop phase and the cycle end interact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    /// The loop is terminal. An infinite loop never reaches the exit.
    Continuous,
    /// Entrance, hold-bounded loop, exit, then complete.
    #[default]
    #[serde(alias = "single")]
    SingleCycle,
    /// As [`PlaybackMode::SingleCycle`], restarting after the inter-cycle delay.
    Cycling,
}

/// Phase state of a timeline at some instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Nothing started yet.
    Idle,
    /// Entrance phase running.
    Entering,
    /// Loop phase running.
    Looping,
    /// Exit phase running.
    Exiting,
    /// Cycle finished (or waiting for the next cycle).
    Complete,
}

impl PlaybackState {
    /// Phase that drives this state, if any.
    pub fn phase(self) -> Option<PhaseName> {
        match self {
            Self::Entering => Some(PhaseName::Entrance),
            Self::Looping => Some(PhaseName::Loop),
            Self::Exiting => Some(PhaseName::Exit),
            Self::Idle | Self::Complete => None,
        }
    }
}

/// Where a timeline time falls in the schedule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineCursor {
    /// Phase state.
    pub state: PlaybackState,
    /// Zero-based cycle number (always 0 outside cycling mode).
    pub cycle: u64,
    /// Seconds since the current state began.
    pub phase_time: f64,
}

/// Phase lengths of a compiled timeline, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schedule {
    /// Playback mode.
    pub mode: PlaybackMode,
    /// Entrance length.
    pub entrance_secs: f64,
    /// Loop length; `None` when the loop never ends.
    pub loop_secs: Option<f64>,
    /// Loop units that fit the hold, when the hold bounds the loop.
    pub loop_iterations: Option<u64>,
    /// Exit length (ignored in continuous mode).
    pub exit_secs: f64,
    /// Pause between cycles (cycling mode only).
    pub inter_cycle_delay_secs: f64,
}

impl Schedule {
    /// Length of one pass through the phases, or `None` if the loop never ends.
    pub fn cycle_secs(&self) -> Option<f64> {
        let looping = self.loop_secs?;
        Some(match self.mode {
            PlaybackMode::Continuous => self.entrance_secs + looping,
            PlaybackMode::SingleCycle | PlaybackMode::Cycling => {
                self.entrance_secs + looping + self.exit_secs
            }
        })
    }

    /// Time until playback completes, or `None` when it never does.
    pub fn total_secs(&self) -> Option<f64> {
        match self.mode {
            PlaybackMode::Cycling => None,
            PlaybackMode::Continuous | PlaybackMode::SingleCycle => self.cycle_secs(),
        }
    }

    /// Repeat period in cycling mode.
    pub fn period_secs(&self) -> Option<f64> {
        match self.mode {
            PlaybackMode::Cycling => self.cycle_secs().map(|c| c + self.inter_cycle_delay_secs),
            PlaybackMode::Continuous | PlaybackMode::SingleCycle => None,
        }
    }

    /// Map a timeline time to its phase state.
    pub fn locate(&self, t: f64) -> TimelineCursor {
        if t < 0.0 {
            return TimelineCursor {
                state: PlaybackState::Idle,
                cycle: 0,
                phase_time: 0.0,
            };
        }
        let (cycle, local) = match self.period_secs() {
            Some(period) if period > 0.0 => {
                let k = (t / period).floor();
                (k as u64, (t - k * period).max(0.0))
            }
            _ => (0, t),
        };
        let at = |state, phase_time| TimelineCursor {
            state,
            cycle,
            phase_time,
        };

        if local < self.entrance_secs {
            return at(PlaybackState::Entering, local);
        }
        let local = local - self.entrance_secs;
        let Some(looping) = self.loop_secs else {
            return at(PlaybackState::Looping, local);
        };
        if local < looping {
            return at(PlaybackState::Looping, local);
        }
        let local = local - looping;
        if self.mode == PlaybackMode::Continuous {
            return at(PlaybackState::Complete, local);
        }
        if local < self.exit_secs {
            return at(PlaybackState::Exiting, local);
        }
        at(PlaybackState::Complete, local - self.exit_secs)
    }
}

/// Compiled, immutable animation of one text.
///
/// Evaluation is a pure function of time, so seeking to `t` produces exactly what natural playback
/// shows at `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    positions: Vec<CharacterPosition>,
    base: Pose,
    entrance: ResolvedPhase,
    looping: ResolvedPhase,
    exit: ResolvedPhase,
    schedule: Schedule,
}

impl Timeline {
    pub(crate) fn from_parts(
        positions: Vec<CharacterPosition>,
        base: Pose,
        [entrance, looping, exit]: [ResolvedPhase; 3],
        schedule: Schedule,
    ) -> Self {
        Self {
            positions,
            base,
            entrance,
            looping,
            exit,
            schedule,
        }
    }

    /// Timeline that shows every character at rest, fully visible, and completes immediately.
    pub fn static_visible(positions: Vec<CharacterPosition>, weight: f64) -> Self {
        let n = positions.len();
        Self::from_parts(
            positions,
            Pose::rest(weight),
            [
                ResolvedPhase::fixed(PhaseName::Entrance, n),
                ResolvedPhase::fixed(PhaseName::Loop, n),
                ResolvedPhase::fixed(PhaseName::Exit, n),
            ],
            Schedule {
                mode: PlaybackMode::SingleCycle,
                entrance_secs: 0.0,
                loop_secs: Some(0.0),
                loop_iterations: None,
                exit_secs: 0.0,
                inter_cycle_delay_secs: 0.0,
            },
        )
    }

    /// Phase lengths.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Playback mode.
    pub fn mode(&self) -> PlaybackMode {
        self.schedule.mode
    }

    /// Rest placements, one per character.
    pub fn positions(&self) -> &[CharacterPosition] {
        &self.positions
    }

    /// Number of characters.
    pub fn character_count(&self) -> usize {
        self.positions.len()
    }

    /// Compiled phase.
    pub fn phase(&self, name: PhaseName) -> &ResolvedPhase {
        match name {
            PhaseName::Entrance => &self.entrance,
            PhaseName::Loop => &self.looping,
            PhaseName::Exit => &self.exit,
        }
    }

    /// Time until playback completes, or `None` for an unbounded timeline.
    pub fn duration_secs(&self) -> Option<f64> {
        self.schedule.total_secs()
    }

    /// Phase state at `t`.
    pub fn cursor_at(&self, t: f64) -> TimelineCursor {
        self.schedule.locate(t)
    }

    /// Pose of character `index` at `t`.
    pub fn pose_at(&self, index: usize, t: f64) -> Pose {
        self.pose_for(index, self.cursor_at(t))
    }

    fn pose_for(&self, index: usize, cursor: TimelineCursor) -> Pose {
        let base = &self.base;
        let bound = self.schedule.loop_iterations;
        match cursor.state {
            PlaybackState::Idle => self.entrance.pose_at(index, 0.0, base, None),
            PlaybackState::Entering => self.entrance.pose_at(index, cursor.phase_time, base, None),
            PlaybackState::Looping => self.looping.pose_at(index, cursor.phase_time, base, bound),
            PlaybackState::Exiting => self.exit.pose_at(index, cursor.phase_time, base, None),
            PlaybackState::Complete => match self.schedule.mode {
                PlaybackMode::Continuous => {
                    self.looping.pose_at(index, f64::INFINITY, base, bound)
                }
                PlaybackMode::SingleCycle | PlaybackMode::Cycling => {
                    self.exit.pose_at(index, f64::INFINITY, base, None)
                }
            },
        }
    }

    /// Write the state at `t` into `target`, one element per character.
    pub fn apply<T: AnimationTarget + ?Sized>(&self, t: f64, target: &mut T) -> TimelineCursor {
        let cursor = self.cursor_at(t);
        let count = self.positions.len().min(target.element_count());
        for (i, rest) in self.positions.iter().take(count).enumerate() {
            let pose = self.pose_for(i, cursor);
            target.set_transform(i, CharTransform::compose(rest, &pose));
            target.set_opacity(i, compose_opacity(rest, &pose));
            target.set_filter_params(i, FilterParams::from_pose(&pose));
        }
        cursor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/machine.rs"]
mod tests;

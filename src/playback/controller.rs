use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::stage::surface::AnimationTarget;
use crate::timeline::machine::{PlaybackMode, PlaybackState, Timeline, TimelineCursor};

/// A state transition observed at a frame boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseChange {
    /// State before the transition.
    pub from: PlaybackState,
    /// State after the transition.
    pub to: PlaybackState,
    /// Cycle the new state belongs to.
    pub cycle: u64,
}

#[derive(Clone, Copy, Debug)]
struct PendingNotice {
    generation: u64,
    change: PhaseChange,
}

type PhaseListener = Box<dyn FnMut(PhaseChange)>;

/// Drives one [`Timeline`] against an animation target.
///
/// Time only advances in [`PlaybackController::tick`]. Control calls (`seek`, `restart`, ...)
/// mark the controller dirty and their visual effect lands on the next tick. Phase-change
/// notices are queued when observed and delivered at the start of the following tick; a notice
/// queued before `stop` or `load` is dropped.
pub struct PlaybackController {
    timeline: Option<Timeline>,
    playhead: f64,
    rate: f64,
    playing: bool,
    dirty: bool,
    generation: u64,
    last: Option<TimelineCursor>,
    pending: Vec<PendingNotice>,
    listeners: Vec<PhaseListener>,
    max_seek_horizon: Option<f64>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("loaded", &self.timeline.is_some())
            .field("playhead", &self.playhead)
            .field("rate", &self.rate)
            .field("playing", &self.playing)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PlaybackController {
    /// Controller with nothing loaded.
    pub fn new() -> Self {
        Self {
            timeline: None,
            playhead: 0.0,
            rate: 1.0,
            playing: false,
            dirty: false,
            generation: 0,
            last: None,
            pending: Vec::new(),
            listeners: Vec::new(),
            max_seek_horizon: None,
        }
    }

    /// Allow seeking unbounded timelines, clamped to `horizon` seconds.
    pub fn with_max_seek_horizon(mut self, horizon: Option<f64>) -> Self {
        self.max_seek_horizon = horizon;
        self
    }

    /// Take ownership of `timeline`, paused at its start.
    pub fn load(&mut self, timeline: Timeline) {
        self.generation += 1;
        self.timeline = Some(timeline);
        self.playhead = 0.0;
        self.playing = false;
        self.dirty = true;
        self.last = None;
        tracing::debug!(generation = self.generation, "timeline loaded");
    }

    /// Currently loaded timeline.
    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    /// Token bumped by every `load` and `stop`.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Timeline time in seconds.
    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Playback speed multiplier.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Return `true` while time advances on tick.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// State at the playhead, `Idle` when nothing is loaded.
    pub fn state(&self) -> PlaybackState {
        self.timeline
            .as_ref()
            .map_or(PlaybackState::Idle, |tl| tl.cursor_at(self.playhead).state)
    }

    /// Fraction of the timeline played, in `[0, 1]`.
    ///
    /// Cycling timelines report progress through the current cycle. Unbounded continuous
    /// timelines have no progress.
    pub fn progress(&self) -> Option<f64> {
        let tl = self.timeline.as_ref()?;
        match tl.duration_secs() {
            Some(total) if total > 0.0 => Some((self.playhead / total).clamp(0.0, 1.0)),
            Some(_) => Some(1.0),
            None => {
                let period = tl.schedule().period_secs().filter(|p| *p > 0.0)?;
                Some(self.playhead.rem_euclid(period) / period)
            }
        }
    }

    /// Start or resume. A finished timeline starts over.
    pub fn play(&mut self) {
        let Some(tl) = self.timeline.as_ref() else {
            return;
        };
        if let Some(total) = tl.duration_secs()
            && self.playhead >= total
        {
            self.playhead = 0.0;
            self.dirty = true;
        }
        self.playing = true;
    }

    /// Freeze the playhead.
    pub fn pause(&mut self) {
        if self.timeline.is_some() {
            self.playing = false;
        }
    }

    /// Drop the timeline. Nothing reaches the target afterwards and queued notices are discarded.
    pub fn stop(&mut self) {
        if self.timeline.take().is_none() {
            return;
        }
        self.generation += 1;
        self.playhead = 0.0;
        self.playing = false;
        self.dirty = false;
        self.last = None;
        tracing::debug!(generation = self.generation, "playback stopped");
    }

    /// Jump back to the start, keeping the play/pause state.
    pub fn restart(&mut self) {
        if self.timeline.is_none() {
            return;
        }
        self.playhead = 0.0;
        self.dirty = true;
        self.last = None;
    }

    /// Move the playhead to `t` seconds.
    ///
    /// Finite timelines clamp to their length and cycling timelines accept any time. Other
    /// unbounded timelines fail with [`KinetypeError::InvalidOperation`] unless a seek horizon is
    /// configured.
    pub fn seek(&mut self, t: f64) -> KinetypeResult<()> {
        if !t.is_finite() || t < 0.0 {
            return Err(KinetypeError::validation(format!(
                "seek time must be finite and >= 0, got {t}"
            )));
        }
        let Some(tl) = self.timeline.as_ref() else {
            return Ok(());
        };
        let target = match (tl.duration_secs(), tl.mode()) {
            (Some(total), _) => t.min(total),
            (None, PlaybackMode::Cycling) => t,
            (None, _) => match self.max_seek_horizon {
                Some(horizon) => t.min(horizon),
                None => {
                    return Err(KinetypeError::invalid_operation(
                        "cannot seek an infinite timeline without a seek horizon",
                    ));
                }
            },
        };
        self.playhead = target;
        self.dirty = true;
        Ok(())
    }

    /// Put the playhead back to a time it held earlier, bypassing the seek bounds.
    pub(crate) fn restore_playhead(&mut self, t: f64) {
        if self.timeline.is_none() {
            return;
        }
        self.playhead = t;
        self.dirty = true;
    }

    /// Change the speed multiplier.
    pub fn set_rate(&mut self, rate: f64) -> KinetypeResult<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(KinetypeError::validation(format!(
                "playback rate must be finite and > 0, got {rate}"
            )));
        }
        if self.timeline.is_some() {
            self.rate = rate;
        }
        Ok(())
    }

    /// Register a phase-change listener.
    pub fn on_phase_change(&mut self, listener: impl FnMut(PhaseChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Advance by `dt` wall seconds and write the resulting state into `target`.
    ///
    /// Returns the cursor that was applied, or `None` when nothing was written (no timeline, or
    /// paused with no pending change).
    pub fn tick<T: AnimationTarget + ?Sized>(
        &mut self,
        dt: f64,
        target: &mut T,
    ) -> KinetypeResult<Option<TimelineCursor>> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(KinetypeError::validation(format!(
                "tick delta must be finite and >= 0, got {dt}"
            )));
        }
        self.dispatch_pending();

        let Some(tl) = self.timeline.as_ref() else {
            return Ok(None);
        };
        if !self.playing && !self.dirty {
            return Ok(None);
        }
        if self.playing {
            self.playhead += dt * self.rate;
            if let Some(total) = tl.duration_secs()
                && self.playhead >= total
            {
                self.playhead = total;
                self.playing = false;
            }
        }

        let cursor = tl.apply(self.playhead, target);
        self.dirty = false;
        let changed = match self.last {
            None => true,
            Some(prev) => prev.state != cursor.state || prev.cycle != cursor.cycle,
        };
        if changed {
            self.pending.push(PendingNotice {
                generation: self.generation,
                change: PhaseChange {
                    from: self.last.map_or(PlaybackState::Idle, |c| c.state),
                    to: cursor.state,
                    cycle: cursor.cycle,
                },
            });
        }
        self.last = Some(cursor);
        Ok(Some(cursor))
    }

    fn dispatch_pending(&mut self) {
        for notice in std::mem::take(&mut self.pending) {
            if notice.generation != self.generation {
                tracing::trace!(generation = notice.generation, "dropping stale phase notice");
                continue;
            }
            for listener in &mut self.listeners {
                listener(notice.change);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;

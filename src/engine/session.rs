use std::collections::BTreeMap;
use std::sync::Arc;

use crate::capture::export::{CaptureSlot, ExportOptions, ExportProgress, Exporter, sink_for};
use crate::effects::particles::ParticleField;
use crate::encode::sink::FrameSink;
use crate::engine::config::EngineConfig;
use crate::foundation::core::{Canvas, Fps, Point, Rect};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::{Fnv1a64, seed_from_str};
use crate::layout::catalog::{Layout, LayoutCatalog};
use crate::layout::generator::{CharacterPosition, LayoutKind, LayoutOptions};
use crate::playback::controller::{PhaseChange, PlaybackController};
use crate::preset::catalog::PresetCatalog;
use crate::preset::keyword::{TextEffectOptions, keyword_preset};
use crate::preset::model::{AnimationConfig, PhaseName, Preset};
use crate::render::backend::FrameRGBA;
use crate::stage::headless::HeadlessSurface;
use crate::stage::materializer::Materializer;
use crate::stage::surface::RenderSurface;
use crate::timeline::builder::{TimelineBuilder, TimelineSettings};
use crate::timeline::machine::{PlaybackMode, Timeline, TimelineCursor};

/// Per-call options for [`Engine::apply_preset`].
#[derive(Clone, Debug, PartialEq)]
pub struct ApplyOptions {
    /// Layout name; unknown names fall back to `grid`.
    pub layout: Option<String>,
    /// Layout geometry; centered on the canvas when `None`.
    pub layout_options: Option<LayoutOptions>,
    /// Phase overrides that win over layout and preset animations.
    pub custom_animations: Option<BTreeMap<PhaseName, AnimationConfig>>,
    /// Playback mode; the engine's when `None`.
    pub mode: Option<PlaybackMode>,
    /// Loop length in cycle modes; the engine's when `None`.
    pub hold_secs: Option<f64>,
    /// Start playing immediately.
    pub autoplay: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            layout: None,
            layout_options: None,
            custom_animations: None,
            mode: None,
            hold_secs: None,
            autoplay: true,
        }
    }
}

/// Identifies one applied timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineHandle(pub u64);

/// Result of applying a preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppliedPreset {
    /// Handle of the new timeline.
    pub handle: TimelineHandle,
    /// Time until playback completes, `None` when it never does.
    pub duration_secs: Option<f64>,
    /// Engine frame rate.
    pub fps: Fps,
    /// Characters animated.
    pub character_count: usize,
    /// `true` when a malformed preset was replaced by static, fully visible text.
    pub recovered: bool,
}

/// Text animation engine: catalogs, one rendering surface and its playback.
///
/// Applying a preset replaces whatever was playing. The previous timeline is stopped and the
/// surface cleared only after the new one has been compiled, so a failed apply leaves the stage
/// untouched.
pub struct Engine {
    config: EngineConfig,
    presets: PresetCatalog,
    layouts: LayoutCatalog,
    surface: Box<dyn RenderSurface>,
    controller: PlaybackController,
    particles: Option<ParticleField>,
    capture: CaptureSlot,
    next_handle: u64,
    active: Option<TimelineHandle>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("presets", &self.presets.len())
            .field("surface", &self.surface.size())
            .field("controller", &self.controller)
            .field("active", &self.active)
            .finish()
    }
}

impl Engine {
    /// Engine with the built-in presets and layouts drawing into `surface`.
    pub fn new(config: EngineConfig, surface: Box<dyn RenderSurface>) -> KinetypeResult<Self> {
        Self::with_catalogs(
            config,
            surface,
            PresetCatalog::with_builtins()?,
            LayoutCatalog::with_builtins(),
        )
    }

    /// Engine over a [`HeadlessSurface`] of the configured canvas size.
    pub fn headless(config: EngineConfig) -> KinetypeResult<Self> {
        let surface = Box::new(HeadlessSurface::new(config.canvas));
        Self::new(config, surface)
    }

    /// Engine with explicit catalogs.
    pub fn with_catalogs(
        config: EngineConfig,
        surface: Box<dyn RenderSurface>,
        presets: PresetCatalog,
        layouts: LayoutCatalog,
    ) -> KinetypeResult<Self> {
        config.validate()?;
        if surface.size() != config.canvas {
            let s = surface.size();
            return Err(KinetypeError::validation(format!(
                "surface is {}x{} but the config canvas is {}x{}",
                s.width, s.height, config.canvas.width, config.canvas.height
            )));
        }
        let controller =
            PlaybackController::new().with_max_seek_horizon(config.max_seek_horizon_secs);
        Ok(Self {
            config,
            presets,
            layouts,
            surface,
            controller,
            particles: None,
            capture: CaptureSlot::new(),
            next_handle: 0,
            active: None,
        })
    }

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Preset catalog.
    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    /// Mutable preset catalog, for registering custom presets.
    pub fn presets_mut(&mut self) -> &mut PresetCatalog {
        &mut self.presets
    }

    /// Layout catalog.
    pub fn layouts(&self) -> &LayoutCatalog {
        &self.layouts
    }

    /// Mutable layout catalog.
    pub fn layouts_mut(&mut self) -> &mut LayoutCatalog {
        &mut self.layouts
    }

    /// Rendering surface.
    pub fn surface(&self) -> &dyn RenderSurface {
        self.surface.as_ref()
    }

    /// Playback state.
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Mutable playback state.
    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    /// Slot an export must hold while recording.
    pub fn capture_slot(&self) -> &CaptureSlot {
        &self.capture
    }

    /// Handle of the timeline currently loaded.
    pub fn active_handle(&self) -> Option<TimelineHandle> {
        self.controller.timeline().and(self.active)
    }

    /// Registered preset names in sorted order.
    pub fn list_preset_names(&self) -> Vec<String> {
        self.presets.list_names()
    }

    /// Look up a preset.
    pub fn get_preset(&self, name: &str) -> Option<Arc<Preset>> {
        self.presets.get(name)
    }

    /// Lay out `text`, compile `preset_name` into a timeline and start it.
    ///
    /// An unknown preset fails with [`KinetypeError::PresetNotFound`] before anything changes. A
    /// malformed preset is logged and replaced by a static, fully visible rendition; the result
    /// reports `recovered = true`.
    #[tracing::instrument(skip(self, text, opts), fields(chars = text.chars().count()))]
    pub fn apply_preset(
        &mut self,
        text: &str,
        preset_name: &str,
        opts: ApplyOptions,
    ) -> KinetypeResult<AppliedPreset> {
        let preset = self
            .presets
            .get(preset_name)
            .ok_or_else(|| KinetypeError::preset_not_found(preset_name))?;
        self.apply_resolved(text, preset, opts)
    }

    /// Keyword-driven mode: build an ad-hoc preset from `opts` and play `text` on one line.
    ///
    /// `loop_enabled` selects cycling playback. Without it a single finite cycle is played,
    /// so the text always exits on its own.
    pub fn play_text(
        &mut self,
        text: &str,
        opts: &TextEffectOptions,
    ) -> KinetypeResult<AppliedPreset> {
        if !opts.font_size.is_finite() || opts.font_size <= 0.0 {
            return Err(KinetypeError::validation(format!(
                "font size must be > 0, got {}",
                opts.font_size
            )));
        }
        let center = self.config.canvas.center();
        let layout_options = LayoutOptions {
            spacing: opts.font_size * 0.75,
            columns: Some(text.chars().count().max(1)),
            ..LayoutOptions::centered(center.x, center.y)
        };
        let apply = ApplyOptions {
            layout: Some(LayoutKind::Grid.name().to_owned()),
            layout_options: Some(layout_options),
            custom_animations: None,
            mode: Some(if opts.loop_enabled {
                PlaybackMode::Cycling
            } else {
                PlaybackMode::SingleCycle
            }),
            hold_secs: opts.hold_duration,
            autoplay: true,
        };
        self.apply_resolved(text, Arc::new(keyword_preset(opts)), apply)
    }

    fn apply_resolved(
        &mut self,
        text: &str,
        preset: Arc<Preset>,
        opts: ApplyOptions,
    ) -> KinetypeResult<AppliedPreset> {
        let layout_name = opts.layout.as_deref().unwrap_or(LayoutKind::Grid.name());
        let layout = self
            .layouts
            .resolve(layout_name)
            .unwrap_or_else(|| Arc::new(Layout::new("grid", LayoutKind::Grid)));
        let center = self.config.canvas.center();
        let layout_options = opts
            .layout_options
            .unwrap_or_else(|| LayoutOptions::centered(center.x, center.y));
        let positions = layout.calculate(text, &layout_options)?;

        let reduced_motion = self.config.reduced_motion.resolve();
        let seed = seed_from_str(text);
        let settings = TimelineSettings {
            mode: opts.mode.unwrap_or(self.config.mode),
            hold_secs: opts.hold_secs.unwrap_or(self.config.hold_secs),
            inter_cycle_delay_secs: self.config.inter_cycle_delay_secs,
            reduced_motion,
            seed,
        };
        let mut builder = TimelineBuilder::new(&preset, settings).layout_animations(&layout.animations);
        if let Some(custom) = opts.custom_animations.as_ref() {
            builder = builder.custom_animations(custom);
        }
        let (timeline, recovered) = match builder.build(positions.clone()) {
            Ok(timeline) => (timeline, false),
            Err(err) if err.is_recoverable() => {
                tracing::error!(error = %err, preset = %preset.name, "showing static text instead");
                (
                    Timeline::static_visible(positions.clone(), preset.styles.font_weight),
                    true,
                )
            }
            Err(err) => return Err(err),
        };

        let particles = match (&preset.particles, reduced_motion) {
            (Some(cfg), false) => Some(ParticleField::new(
                cfg.clone(),
                emitter_bounds(&positions, preset.styles.font_size, self.config.canvas),
                particle_seed(seed),
            )?),
            _ => None,
        };

        // Everything that can fail has run; replace the previous stage.
        self.controller.stop();
        self.particles = None;
        let character_count = Materializer::materialize(self.surface.as_mut(), &positions, &preset)?;

        let duration_secs = timeline.duration_secs();
        self.controller.load(timeline);
        self.particles = particles;
        self.tick(0.0)?;
        if opts.autoplay {
            self.controller.play();
        }

        self.next_handle += 1;
        let handle = TimelineHandle(self.next_handle);
        self.active = Some(handle);
        tracing::debug!(
            preset = %preset.name,
            layout = %layout.name,
            characters = character_count,
            duration = ?duration_secs,
            recovered,
            "preset applied"
        );
        Ok(AppliedPreset {
            handle,
            duration_secs,
            fps: self.config.fps,
            character_count,
            recovered,
        })
    }

    /// Start or resume playback.
    pub fn play(&mut self) {
        self.controller.play();
    }

    /// Freeze playback.
    pub fn pause(&mut self) {
        self.controller.pause();
    }

    /// Stop playback and drop the timeline. The last drawn state stays on the surface.
    pub fn stop(&mut self) {
        self.controller.stop();
        self.particles = None;
    }

    /// Jump back to the start.
    pub fn restart(&mut self) {
        self.controller.restart();
    }

    /// Move the playhead; see [`PlaybackController::seek`].
    pub fn seek(&mut self, t: f64) -> KinetypeResult<()> {
        self.controller.seek(t)
    }

    /// Change the speed multiplier.
    pub fn set_rate(&mut self, rate: f64) -> KinetypeResult<()> {
        self.controller.set_rate(rate)
    }

    /// Register a phase-change listener.
    pub fn on_phase_change(&mut self, listener: impl FnMut(PhaseChange) + 'static) {
        self.controller.on_phase_change(listener);
    }

    /// Advance playback by `dt` seconds and update the surface.
    pub fn tick(&mut self, dt: f64) -> KinetypeResult<Option<TimelineCursor>> {
        let cursor = self.controller.tick(dt, self.surface.as_mut())?;
        if cursor.is_some()
            && let Some(field) = &self.particles
        {
            self.surface
                .set_particles(&field.sample(self.controller.playhead()));
        }
        Ok(cursor)
    }

    /// Rasterize the current surface state.
    pub fn render_frame(&mut self) -> KinetypeResult<FrameRGBA> {
        self.surface.draw()
    }

    /// Record into `sink`; see [`Exporter::export`].
    pub fn export(
        &mut self,
        opts: &ExportOptions,
        sink: &mut dyn FrameSink,
        progress: Option<&mut dyn FnMut(ExportProgress)>,
    ) -> KinetypeResult<Vec<u8>> {
        Exporter::export(self, opts, sink, progress)
    }

    /// Record into the default sink for `opts.format` and return the encoded bytes.
    pub fn export_encoded(
        &mut self,
        opts: &ExportOptions,
        progress: Option<&mut dyn FnMut(ExportProgress)>,
    ) -> KinetypeResult<Vec<u8>> {
        let mut sink = sink_for(opts);
        Exporter::export(self, opts, sink.as_mut(), progress)
    }
}

/// Region particles spawn from: the text bounds grown by one font size, or the whole canvas.
fn emitter_bounds(positions: &[CharacterPosition], font_size: f64, canvas: Canvas) -> Rect {
    let Some(first) = positions.first() else {
        return Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height));
    };
    let bounds = positions.iter().fold(
        Rect::new(first.x, first.y, first.x, first.y),
        |r, p| r.union_pt(Point::new(p.x, p.y)),
    );
    bounds.inflate(font_size, font_size)
}

fn particle_seed(seed: u64) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_bytes(b"particles");
    h.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/engine/session.rs"]
mod tests;

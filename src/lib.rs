//! Kinetype animates text one character at a time.
//!
//! Text is laid out into per-character rest positions, a named preset is compiled into a
//! three-phase timeline (entrance, loop, exit) and a playback controller drives that timeline
//! into a rendering surface. Recordings of a surface can be encoded to MP4, WebM or GIF.
//!
//! - Build an [`Engine`] from an [`EngineConfig`] and a [`RenderSurface`]
//! - Apply a preset with [`Engine::apply_preset`] or the keyword mode [`Engine::play_text`]
//! - Drive it with [`Engine::tick`], or record it with [`Engine::export`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod capture;
pub(crate) mod effects;
/// Encoding sinks.
pub mod encode;
pub(crate) mod engine;
pub(crate) mod layout;
pub(crate) mod playback;
pub(crate) mod preset;
pub(crate) mod render;
pub(crate) mod stage;
pub(crate) mod timeline;

pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, Point, Rect, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{KinetypeError, KinetypeResult};

pub use crate::animation::ease::{Ease, EaseDir};
pub use crate::animation::pose::{Keyframe, Pose, Property};
pub use crate::capture::export::{
    CaptureGuard, CaptureSlot, ExportFormat, ExportOptions, ExportProgress, Exporter, sink_for,
};
pub use crate::effects::particles::{Particle, ParticleField};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoFormat};
pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, Quality, SinkConfig};
pub use crate::engine::config::{EngineConfig, MotionPreference, REDUCED_MOTION_ENV};
pub use crate::engine::session::{AppliedPreset, ApplyOptions, Engine, TimelineHandle};
pub use crate::layout::catalog::{Layout, LayoutCatalog};
pub use crate::layout::generator::{CharacterPosition, LayoutKind, LayoutOptions, calculate};
pub use crate::playback::controller::{PhaseChange, PlaybackController};
pub use crate::preset::builtin::{builtin_presets, builtin_value};
pub use crate::preset::catalog::PresetCatalog;
pub use crate::preset::color::StyleColor;
pub use crate::preset::keyword::{
    LoopEffect, RevealEffect, TextEffectOptions, Theme, keyword_preset,
};
pub use crate::preset::model::{
    AnimationConfig, ParticleConfig, PhaseName, Preset, PresetStyles, Stagger, StaggerOrigin,
    TimeSpec, TypewriterConfig,
};
pub use crate::render::backend::{FrameRGBA, SurfaceKind, create_surface};
pub use crate::render::cpu::{CpuSurface, CpuSurfaceOpts};
pub use crate::stage::headless::{HeadlessElement, HeadlessSurface};
pub use crate::stage::materializer::Materializer;
pub use crate::stage::surface::{
    AnimationTarget, CharTransform, ElementStyle, FilterParams, RenderSurface, compose_opacity,
};
pub use crate::timeline::builder::{TimelineBuilder, TimelineSettings};
pub use crate::timeline::machine::{
    PlaybackMode, PlaybackState, Schedule, Timeline, TimelineCursor,
};
pub use crate::timeline::phase::{PhaseMotion, RepeatCount, ResolvedPhase, Tween};

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::pose::Property;
use crate::effects::particles::Particle;
use crate::engine::config::MotionPreference;
use crate::preset::color::StyleColor;
use crate::preset::keyword::RevealEffect;
use crate::stage::surface::{AnimationTarget, CharTransform, ElementStyle, FilterParams};
use crate::timeline::machine::PlaybackState;

/// Headless surface the test keeps a handle to after handing it to the engine.
#[derive(Clone)]
struct Shared(Rc<RefCell<HeadlessSurface>>);

impl Shared {
    fn new(canvas: Canvas) -> Self {
        Self(Rc::new(RefCell::new(HeadlessSurface::new(canvas))))
    }

    fn with<R>(&self, f: impl FnOnce(&HeadlessSurface) -> R) -> R {
        f(&self.0.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut HeadlessSurface) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl AnimationTarget for Shared {
    fn element_count(&self) -> usize {
        self.with(|s| s.element_count())
    }
    fn set_transform(&mut self, index: usize, transform: CharTransform) {
        self.with_mut(|s| s.set_transform(index, transform));
    }
    fn set_opacity(&mut self, index: usize, opacity: f64) {
        self.with_mut(|s| s.set_opacity(index, opacity));
    }
    fn set_filter_params(&mut self, index: usize, params: FilterParams) {
        self.with_mut(|s| s.set_filter_params(index, params));
    }
}

impl RenderSurface for Shared {
    fn size(&self) -> Canvas {
        self.with(|s| s.size())
    }
    fn clear(&mut self) {
        self.with_mut(|s| s.clear());
    }
    fn set_background(&mut self, color: Option<StyleColor>) {
        self.with_mut(|s| s.set_background(color));
    }
    fn create_element(&mut self, style: ElementStyle) -> usize {
        self.with_mut(|s| s.create_element(style))
    }
    fn set_particles(&mut self, particles: &[Particle]) {
        self.with_mut(|s| s.set_particles(particles));
    }
    fn draw(&mut self) -> KinetypeResult<FrameRGBA> {
        self.with_mut(|s| s.draw())
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        canvas: Canvas::new(320, 180).unwrap(),
        fps: Fps::integer(30).unwrap(),
        hold_secs: 2.0,
        reduced_motion: MotionPreference::Never,
        ..EngineConfig::default()
    }
}

fn engine() -> (Engine, Shared) {
    let cfg = config();
    let surface = Shared::new(cfg.canvas);
    let engine = Engine::new(cfg, Box::new(surface.clone())).unwrap();
    (engine, surface)
}

#[test]
fn surface_must_match_the_canvas() {
    let surface = Box::new(HeadlessSurface::new(Canvas::new(10, 10).unwrap()));
    let err = Engine::new(config(), surface).unwrap_err();
    assert!(matches!(err, KinetypeError::Validation(_)));
}

#[test]
fn builtins_are_listed() {
    let (engine, _) = engine();
    let names = engine.list_preset_names();
    assert!(names.iter().any(|n| n == "neon"));
    assert!(engine.get_preset("typewriter").is_some());
    assert!(engine.get_preset("nope").is_none());
}

#[test]
fn apply_materializes_and_plays() {
    let (mut engine, surface) = engine();
    let applied = engine
        .apply_preset("HELLO", "minimal", ApplyOptions::default())
        .unwrap();
    assert_eq!(applied.character_count, 5);
    assert!(!applied.recovered);
    assert_eq!(applied.fps, Fps::integer(30).unwrap());
    assert!(applied.duration_secs.is_some());
    assert_eq!(surface.with(|s| s.element_count()), 5);
    assert!(engine.controller().is_playing());
    assert_eq!(engine.active_handle(), Some(applied.handle));
    assert_eq!(engine.controller().state(), PlaybackState::Entering);
}

#[test]
fn unknown_preset_changes_nothing() {
    let (mut engine, surface) = engine();
    let first = engine
        .apply_preset("AB", "neon", ApplyOptions::default())
        .unwrap();
    engine.tick(0.25).unwrap();
    let before = surface.with(|s| s.mutation_count());
    let playhead = engine.controller().playhead();

    let err = engine
        .apply_preset("XYZ", "does-not-exist", ApplyOptions::default())
        .unwrap_err();
    assert!(matches!(err, KinetypeError::PresetNotFound { .. }));
    assert_eq!(surface.with(|s| s.mutation_count()), before);
    assert_eq!(surface.with(|s| s.element_count()), 2);
    assert_eq!(engine.controller().playhead(), playhead);
    assert_eq!(engine.active_handle(), Some(first.handle));
}

#[test]
fn handles_increase_per_apply() {
    let (mut engine, _) = engine();
    let a = engine.apply_preset("A", "minimal", ApplyOptions::default()).unwrap();
    let b = engine.apply_preset("B", "minimal", ApplyOptions::default()).unwrap();
    assert!(b.handle > a.handle);
    engine.stop();
    assert_eq!(engine.active_handle(), None);
}

#[test]
fn stop_silences_the_surface() {
    let (mut engine, surface) = engine();
    engine.apply_preset("STOP", "neon", ApplyOptions::default()).unwrap();
    engine.tick(0.1).unwrap();
    assert_eq!(engine.controller().state(), PlaybackState::Entering);
    engine.stop();
    let before = surface.with(|s| s.mutation_count());
    for _ in 0..30 {
        assert_eq!(engine.tick(1.0 / 60.0).unwrap(), None);
    }
    assert_eq!(surface.with(|s| s.mutation_count()), before);
}

#[test]
fn malformed_preset_falls_back_to_static_text() {
    let (mut engine, surface) = engine();
    let mut broken = AnimationConfig::new(1.0, vec![[(Property::Opacity, 0.0)].into()]);
    broken.repeat = -3;
    engine
        .presets_mut()
        .register(Preset::new("broken").with_phase(PhaseName::Entrance, broken))
        .unwrap();

    let applied = engine
        .apply_preset("OK", "broken", ApplyOptions::default())
        .unwrap();
    assert!(applied.recovered);
    assert_eq!(applied.duration_secs, Some(0.0));
    assert_eq!(engine.controller().state(), PlaybackState::Complete);
    surface.with(|s| {
        assert_eq!(s.element_count(), 2);
        assert!(s.elements().iter().all(|e| e.opacity == 1.0));
    });
}

#[test]
fn autoplay_off_leaves_the_first_frame_drawn() {
    let (mut engine, surface) = engine();
    let opts = ApplyOptions {
        autoplay: false,
        ..ApplyOptions::default()
    };
    engine.apply_preset("HI", "neon", opts).unwrap();
    assert!(!engine.controller().is_playing());
    // neon enters from opacity 0.
    surface.with(|s| assert!(s.elements().iter().all(|e| e.opacity == 0.0)));
    assert_eq!(engine.tick(0.5).unwrap(), None);
}

#[test]
fn particles_follow_the_preset() {
    let (mut engine, surface) = engine();
    engine.apply_preset("HOT", "fire", ApplyOptions::default()).unwrap();
    engine.tick(0.1).unwrap();
    let count = engine.get_preset("fire").unwrap().particles.as_ref().unwrap().count as usize;
    surface.with(|s| assert_eq!(s.particles().len(), count));

    engine.apply_preset("COOL", "minimal", ApplyOptions::default()).unwrap();
    engine.tick(0.1).unwrap();
    surface.with(|s| assert!(s.particles().is_empty()));
}

#[test]
fn reduced_motion_drops_particles_and_shortens_the_entrance() {
    let cfg = EngineConfig {
        reduced_motion: MotionPreference::Always,
        ..config()
    };
    let surface = Shared::new(cfg.canvas);
    let mut engine = Engine::new(cfg, Box::new(surface.clone())).unwrap();
    engine.apply_preset("HOT", "fire", ApplyOptions::default()).unwrap();
    engine.tick(0.2).unwrap();
    surface.with(|s| {
        assert!(s.particles().is_empty());
        assert!(s.elements().iter().all(|e| (e.opacity - 1.0).abs() < 1e-9));
    });
    assert_eq!(engine.controller().state(), PlaybackState::Looping);
}

#[test]
fn play_text_builds_a_single_line() {
    let (mut engine, surface) = engine();
    let opts = TextEffectOptions {
        entrance: RevealEffect::Slide,
        loop_enabled: false,
        hold_duration: Some(1.0),
        font_size: 40.0,
        ..TextEffectOptions::default()
    };
    let applied = engine.play_text("ABC", &opts).unwrap();
    assert_eq!(applied.character_count, 3);
    assert_eq!(
        engine.controller().timeline().unwrap().mode(),
        PlaybackMode::SingleCycle
    );
    let ys: Vec<f64> = engine
        .controller()
        .timeline()
        .unwrap()
        .positions()
        .iter()
        .map(|p| p.y)
        .collect();
    assert!(ys.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(surface.with(|s| s.element_count()), 3);
}

#[test]
fn play_text_without_looping_ends_after_one_pass() {
    let (mut engine, _surface) = engine();
    let opts = TextEffectOptions {
        loop_enabled: false,
        hold_duration: Some(1.0),
        ..TextEffectOptions::default()
    };
    let applied = engine.play_text("HI", &opts).unwrap();
    let total = applied.duration_secs.unwrap();
    let expected = opts.entrance_duration + 1.0 + opts.exit_duration;
    assert!(total >= expected - 1e-9, "{total} < {expected}");
    assert!(total.is_finite());
}

#[test]
fn play_text_rejects_bad_font_size() {
    let (mut engine, _) = engine();
    let opts = TextEffectOptions {
        font_size: 0.0,
        ..TextEffectOptions::default()
    };
    assert!(matches!(
        engine.play_text("A", &opts).unwrap_err(),
        KinetypeError::Validation(_)
    ));
}

#[test]
fn cycling_play_text_has_no_end() {
    let (mut engine, _) = engine();
    let applied = engine
        .play_text("LOOP", &TextEffectOptions::default())
        .unwrap();
    assert_eq!(applied.duration_secs, None);
    assert_eq!(
        engine.controller().timeline().unwrap().mode(),
        PlaybackMode::Cycling
    );
}

#[test]
fn emitter_covers_the_text() {
    let positions = crate::layout::generator::calculate(
        "AB",
        LayoutKind::Grid,
        &LayoutOptions {
            columns: Some(2),
            spacing: 100.0,
            ..LayoutOptions::centered(160.0, 90.0)
        },
    )
    .unwrap();
    let rect = emitter_bounds(&positions, 10.0, Canvas::new(320, 180).unwrap());
    assert!((rect.x0 - 100.0).abs() < 1e-9);
    assert!((rect.x1 - 220.0).abs() < 1e-9);
    let empty = emitter_bounds(&[], 10.0, Canvas::new(320, 180).unwrap());
    assert_eq!(empty, Rect::new(0.0, 0.0, 320.0, 180.0));
}

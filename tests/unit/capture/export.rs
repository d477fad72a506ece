use std::time::Duration;

use super::*;
use crate::engine::config::{EngineConfig, MotionPreference};
use crate::engine::session::ApplyOptions;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::render::backend::FrameRGBA;
use crate::timeline::machine::PlaybackMode;

#[derive(Default)]
struct ScriptedSink {
    inner: InMemorySink,
    unavailable: bool,
    delay: Option<Duration>,
    aborted: bool,
}

impl FrameSink for ScriptedSink {
    fn check_available(&self) -> KinetypeResult<()> {
        if self.unavailable {
            Err(KinetypeError::validation("encoder missing"))
        } else {
            Ok(())
        }
    }
    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()> {
        self.inner.begin(cfg)
    }
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }
        self.inner.push_frame(idx, frame)
    }
    fn end(&mut self) -> KinetypeResult<()> {
        self.inner.end()
    }
    fn abort(&mut self) {
        self.aborted = true;
        self.inner.abort();
    }
}

fn engine(mode: PlaybackMode) -> Engine {
    let cfg = EngineConfig {
        canvas: Canvas::new(64, 36).unwrap(),
        fps: Fps::integer(30).unwrap(),
        mode,
        hold_secs: 1.0,
        reduced_motion: MotionPreference::Never,
        ..EngineConfig::default()
    };
    let mut engine = Engine::headless(cfg).unwrap();
    engine
        .apply_preset("GO", "neon", ApplyOptions::default())
        .unwrap();
    engine
}

#[test]
fn records_the_natural_length_of_a_finite_timeline() {
    let mut engine = engine(PlaybackMode::SingleCycle);
    let total = engine.controller().timeline().unwrap().duration_secs().unwrap();
    let mut sink = InMemorySink::new();
    Exporter::export(&mut engine, &ExportOptions::default(), &mut sink, None).unwrap();

    let expected = Fps::integer(30).unwrap().secs_to_frames_round(total).max(1);
    assert_eq!(sink.frames().len() as u64, expected);
    assert!(sink.is_finished());
    assert_eq!(sink.config().unwrap().width, 64);
    assert!(sink.frames().windows(2).all(|w| w[0].0.0 + 1 == w[1].0.0));
}

#[test]
fn unbounded_timeline_needs_a_duration() {
    let mut engine = engine(PlaybackMode::Cycling);
    let mut sink = InMemorySink::new();
    let err = Exporter::export(&mut engine, &ExportOptions::default(), &mut sink, None).unwrap_err();
    assert!(matches!(err, KinetypeError::Validation(_)));

    let opts = ExportOptions {
        duration_secs: Some(3.0),
        ..ExportOptions::default()
    };
    Exporter::export(&mut engine, &opts, &mut sink, None).unwrap();
    assert_eq!(sink.frames().len(), 90);
}

#[test]
fn progress_reaches_the_total() {
    let mut engine = engine(PlaybackMode::Cycling);
    let opts = ExportOptions {
        duration_secs: Some(0.5),
        fps: Some(Fps::integer(10).unwrap()),
        ..ExportOptions::default()
    };
    let mut seen = Vec::new();
    let mut cb = |p: ExportProgress| seen.push(p);
    Exporter::export(&mut engine, &opts, &mut InMemorySink::new(), Some(&mut cb)).unwrap();
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0].frame, 1);
    assert_eq!(seen[4].fraction(), 1.0);
    assert!(seen.iter().all(|p| p.total_frames == 5));
}

#[test]
fn busy_slot_is_rejected() {
    let mut engine = engine(PlaybackMode::SingleCycle);
    let _held = engine.capture_slot().try_acquire().unwrap();
    let mut sink = InMemorySink::new();
    let err = Exporter::export(&mut engine, &ExportOptions::default(), &mut sink, None).unwrap_err();
    assert!(matches!(err, KinetypeError::ConcurrentExport));
    assert!(sink.frames().is_empty());
}

#[test]
fn slot_is_released_after_failure() {
    let mut engine = engine(PlaybackMode::SingleCycle);
    let mut scripted = ScriptedSink {
        unavailable: true,
        ..ScriptedSink::default()
    };
    let err = Exporter::export(&mut engine, &ExportOptions::default(), &mut scripted, None).unwrap_err();
    assert!(matches!(err, KinetypeError::CaptureUnavailable(_)));
    assert!(scripted.inner.frames().is_empty());
    assert!(!engine.capture_slot().is_busy());
}

#[test]
fn size_must_match_the_surface() {
    let mut engine = engine(PlaybackMode::SingleCycle);
    let opts = ExportOptions {
        width: Some(128),
        ..ExportOptions::default()
    };
    let err = Exporter::export(&mut engine, &opts, &mut InMemorySink::new(), None).unwrap_err();
    assert!(matches!(err, KinetypeError::Validation(_)));
}

#[test]
fn nothing_loaded_is_an_invalid_operation() {
    let mut engine = Engine::headless(EngineConfig {
        canvas: Canvas::new(64, 36).unwrap(),
        ..EngineConfig::default()
    })
    .unwrap();
    let err = Exporter::export(&mut engine, &ExportOptions::default(), &mut InMemorySink::new(), None)
        .unwrap_err();
    assert!(matches!(err, KinetypeError::InvalidOperation(_)));
}

#[test]
fn slow_sink_times_out_and_is_aborted() {
    let mut engine = engine(PlaybackMode::Cycling);
    let opts = ExportOptions {
        duration_secs: Some(0.5),
        fps: Some(Fps::integer(10).unwrap()),
        timeout_margin_secs: Some(0.0),
        ..ExportOptions::default()
    };
    let mut scripted = ScriptedSink {
        delay: Some(Duration::from_millis(200)),
        ..ScriptedSink::default()
    };
    let err = Exporter::export(&mut engine, &opts, &mut scripted, None).unwrap_err();
    match err {
        KinetypeError::ExportTimeout {
            frames_written,
            budget_secs,
            ..
        } => {
            assert!(frames_written < 5);
            assert!((budget_secs - 0.5).abs() < 1e-9);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(scripted.aborted);
    assert!(!engine.capture_slot().is_busy());
}

#[test]
fn playback_settings_are_restored() {
    let mut engine = engine(PlaybackMode::Cycling);
    engine.set_rate(2.0).unwrap();
    engine.pause();
    let opts = ExportOptions {
        duration_secs: Some(0.2),
        ..ExportOptions::default()
    };
    Exporter::export(&mut engine, &opts, &mut InMemorySink::new(), None).unwrap();
    assert_eq!(engine.controller().rate(), 2.0);
    assert!(!engine.controller().is_playing());
}

#[test]
fn playhead_is_put_back_after_recording() {
    let mut engine = engine(PlaybackMode::Cycling);
    engine.seek(0.7).unwrap();
    engine.pause();
    engine.tick(0.0).unwrap();
    let opts = ExportOptions {
        duration_secs: Some(0.2),
        ..ExportOptions::default()
    };
    Exporter::export(&mut engine, &opts, &mut InMemorySink::new(), None).unwrap();
    assert_eq!(engine.controller().playhead(), 0.7);
    assert!(engine.tick(0.0).unwrap().is_none());
}

#[test]
fn default_sinks_follow_the_format() {
    let gif = ExportOptions {
        format: ExportFormat::Gif,
        ..ExportOptions::default()
    };
    assert!(sink_for(&gif).check_available().is_ok());
}

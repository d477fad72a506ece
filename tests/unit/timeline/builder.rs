use super::*;
use crate::animation::pose::Property;
use crate::foundation::error::KinetypeError;
use crate::timeline::machine::PlaybackState;

fn positions(n: usize) -> Vec<CharacterPosition> {
    (0..n)
        .map(|i| CharacterPosition {
            ch: 'x',
            x: i as f64 * 10.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
            opacity: 1.0,
        })
        .collect()
}

fn phase(duration: f64, prop: Property, value: f64) -> AnimationConfig {
    AnimationConfig::new(duration, vec![[(prop, value)].into()])
}

fn preset() -> Preset {
    let mut looping = phase(1.0, Property::Scale, 1.2);
    looping.yoyo = true;
    looping.repeat = -1;
    Preset::new("pulse")
        .with_phase(PhaseName::Entrance, phase(1.0, Property::Opacity, 0.0))
        .with_phase(PhaseName::Loop, looping)
        .with_phase(PhaseName::Exit, phase(0.5, Property::Opacity, 0.0))
}

fn settings(mode: PlaybackMode, hold: f64) -> TimelineSettings {
    TimelineSettings {
        mode,
        hold_secs: hold,
        ..TimelineSettings::default()
    }
}

#[test]
fn hold_fits_whole_loop_units() {
    let p = preset();
    let tl = TimelineBuilder::new(&p, settings(PlaybackMode::SingleCycle, 5.0))
        .build(positions(3))
        .unwrap();
    let s = tl.schedule();
    assert_eq!(s.loop_iterations, Some(2));
    assert_eq!(s.loop_secs, Some(5.0));
    assert_eq!(tl.duration_secs(), Some(1.0 + 5.0 + 0.5));
    // Fifth second of the hold is the unfilled remainder.
    assert_eq!(tl.pose_at(0, 1.0 + 4.5).scale, 1.0);
}

#[test]
fn finite_repeat_caps_the_iterations() {
    let mut p = preset();
    if let Some(l) = p.animations.get_mut(&PhaseName::Loop) {
        l.repeat = 0;
    }
    let tl = TimelineBuilder::new(&p, settings(PlaybackMode::SingleCycle, 10.0))
        .build(positions(1))
        .unwrap();
    assert_eq!(tl.schedule().loop_iterations, Some(1));
}

#[test]
fn continuous_infinite_loop_is_unbounded() {
    let p = preset();
    let tl = TimelineBuilder::new(&p, settings(PlaybackMode::Continuous, 5.0))
        .build(positions(2))
        .unwrap();
    assert_eq!(tl.duration_secs(), None);
    assert_eq!(tl.cursor_at(1e5).state, PlaybackState::Looping);
}

#[test]
fn overrides_take_precedence() {
    let p = preset();
    let layout: BTreeMap<_, _> = [(PhaseName::Entrance, phase(2.0, Property::Y, 40.0))].into();
    let custom: BTreeMap<_, _> = [(PhaseName::Entrance, phase(3.0, Property::X, 40.0))].into();

    let tl = TimelineBuilder::new(&p, TimelineSettings::default())
        .layout_animations(&layout)
        .build(positions(1))
        .unwrap();
    assert_eq!(tl.schedule().entrance_secs, 2.0);

    let tl = TimelineBuilder::new(&p, TimelineSettings::default())
        .layout_animations(&layout)
        .custom_animations(&custom)
        .build(positions(1))
        .unwrap();
    assert_eq!(tl.schedule().entrance_secs, 3.0);
    assert_eq!(tl.schedule().exit_secs, 0.5);
}

#[test]
fn missing_phases_hold_rest() {
    let p = Preset::new("bare");
    let tl = TimelineBuilder::new(&p, settings(PlaybackMode::SingleCycle, 2.0))
        .build(positions(2))
        .unwrap();
    assert_eq!(tl.duration_secs(), Some(2.0));
    assert_eq!(tl.pose_at(1, 0.0), Pose::rest(400.0));
}

#[test]
fn reduced_motion_bounds_entrance_and_exit() {
    let p = preset();
    let s = TimelineSettings {
        reduced_motion: true,
        ..settings(PlaybackMode::SingleCycle, 3.0)
    };
    let tl = TimelineBuilder::new(&p, s).build(positions(20)).unwrap();
    let sch = tl.schedule();
    assert!(sch.entrance_secs <= 0.1);
    assert!(sch.exit_secs <= 0.1);
    assert_eq!(sch.loop_secs, Some(3.0));
    // Loop motion is skipped.
    assert_eq!(tl.pose_at(0, sch.entrance_secs + 0.5).scale, 1.0);

    let s = TimelineSettings {
        reduced_motion: true,
        ..settings(PlaybackMode::Continuous, 3.0)
    };
    let tl = TimelineBuilder::new(&p, s).build(positions(20)).unwrap();
    assert_eq!(tl.duration_secs(), None);
}

#[test]
fn infinite_entrance_is_malformed() {
    let mut p = preset();
    if let Some(e) = p.animations.get_mut(&PhaseName::Entrance) {
        e.repeat = -1;
    }
    let err = TimelineBuilder::new(&p, TimelineSettings::default())
        .build(positions(2))
        .unwrap_err();
    assert!(matches!(err, KinetypeError::MalformedPreset { .. }));
}

#[test]
fn zero_keyframe_loop_is_malformed() {
    let p = preset().with_phase(PhaseName::Loop, AnimationConfig::new(1.0, Vec::new()));
    let err = TimelineBuilder::new(&p, TimelineSettings::default())
        .build(positions(2))
        .unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn negative_hold_is_rejected() {
    let p = preset();
    let err = TimelineBuilder::new(&p, settings(PlaybackMode::SingleCycle, -1.0))
        .build(positions(1))
        .unwrap_err();
    assert!(matches!(err, KinetypeError::Validation(_)));
}

#[test]
fn staggered_loop_settles_before_the_exit() {
    use crate::preset::model::{Stagger, TimeSpec};

    let mut looping = phase(2.0, Property::Scale, 2.0);
    looping.repeat = -1;
    looping.stagger = Some(Stagger::Each(TimeSpec::Seconds(0.5)));
    let p = Preset::new("ripple")
        .with_phase(PhaseName::Loop, looping)
        .with_phase(PhaseName::Exit, phase(0.5, Property::Opacity, 0.0));
    let tl = TimelineBuilder::new(&p, settings(PlaybackMode::SingleCycle, 5.0))
        .build(positions(4))
        .unwrap();
    // The last character starts 1.5s late, leaving room for one whole unit.
    assert_eq!(tl.schedule().loop_iterations, Some(1));
    let loop_end = tl.schedule().entrance_secs + 5.0;
    for i in 0..4 {
        let before = tl.pose_at(i, loop_end - 1e-6);
        let after = tl.pose_at(i, loop_end);
        assert!((before.scale - after.scale).abs() < 1e-3, "char {i} jumps");
    }
}

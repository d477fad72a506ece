use super::*;
use crate::animation::ease::Ease;
use crate::animation::pose::Property;
use crate::preset::model::AnimationConfig;
use crate::stage::headless::HeadlessSurface;
use crate::stage::surface::{ElementStyle, RenderSurface};
use crate::foundation::core::Canvas;
use crate::preset::color::StyleColor;

fn schedule(mode: PlaybackMode, loop_secs: Option<f64>) -> Schedule {
    Schedule {
        mode,
        entrance_secs: 1.0,
        loop_secs,
        loop_iterations: None,
        exit_secs: 0.5,
        inter_cycle_delay_secs: 0.25,
    }
}

fn pos(ch: char, x: f64) -> CharacterPosition {
    CharacterPosition {
        ch,
        x,
        y: 50.0,
        rotation: 0.0,
        scale: 1.0,
        opacity: 1.0,
    }
}

fn fade_timeline(mode: PlaybackMode) -> Timeline {
    let base = Pose::rest(400.0);
    let mut fade = AnimationConfig::new(1.0, vec![[(Property::Opacity, 0.0)].into()]);
    fade.ease = Ease::Linear;
    let mut out = AnimationConfig::new(0.5, vec![[(Property::Opacity, 0.0)].into()]);
    out.ease = Ease::Linear;
    let positions = vec![pos('h', 10.0), pos('i', 30.0)];
    let phases = [
        ResolvedPhase::resolve(PhaseName::Entrance, &fade, "t", 2, &base, 0, false).unwrap(),
        ResolvedPhase::fixed(PhaseName::Loop, 2),
        ResolvedPhase::resolve(PhaseName::Exit, &out, "t", 2, &base, 0, false).unwrap(),
    ];
    Timeline::from_parts(positions, base, phases, schedule(mode, Some(2.0)))
}

#[test]
fn single_cycle_walks_every_state() {
    let s = schedule(PlaybackMode::SingleCycle, Some(2.0));
    assert_eq!(s.total_secs(), Some(3.5));
    assert_eq!(s.locate(-1.0).state, PlaybackState::Idle);
    assert_eq!(s.locate(0.0).state, PlaybackState::Entering);
    assert_eq!(s.locate(1.0).state, PlaybackState::Looping);
    let c = s.locate(3.25);
    assert_eq!(c.state, PlaybackState::Exiting);
    assert!((c.phase_time - 0.25).abs() < 1e-12);
    assert_eq!(s.locate(3.5).state, PlaybackState::Complete);
}

#[test]
fn continuous_infinite_loop_never_exits() {
    let s = schedule(PlaybackMode::Continuous, None);
    assert_eq!(s.total_secs(), None);
    assert_eq!(s.locate(1e6).state, PlaybackState::Looping);
}

#[test]
fn continuous_finite_loop_completes_without_exit() {
    let s = schedule(PlaybackMode::Continuous, Some(2.0));
    assert_eq!(s.total_secs(), Some(3.0));
    assert_eq!(s.locate(3.1).state, PlaybackState::Complete);
}

#[test]
fn cycling_wraps_after_the_delay() {
    let s = schedule(PlaybackMode::Cycling, Some(2.0));
    assert_eq!(s.total_secs(), None);
    assert_eq!(s.period_secs(), Some(3.75));
    assert_eq!(s.locate(3.6).state, PlaybackState::Complete);
    let c = s.locate(3.75 + 0.5);
    assert_eq!(c.state, PlaybackState::Entering);
    assert_eq!(c.cycle, 1);
    assert!((c.phase_time - 0.5).abs() < 1e-12);
}

#[test]
fn states_map_to_phases() {
    assert_eq!(PlaybackState::Looping.phase(), Some(PhaseName::Loop));
    assert_eq!(PlaybackState::Complete.phase(), None);
}

#[test]
fn mode_accepts_short_alias() {
    let m: PlaybackMode = serde_json::from_str("\"single\"").unwrap();
    assert_eq!(m, PlaybackMode::SingleCycle);
    let m: PlaybackMode = serde_json::from_str("\"cycling\"").unwrap();
    assert_eq!(m, PlaybackMode::Cycling);
}

#[test]
fn poses_follow_the_phases() {
    let tl = fade_timeline(PlaybackMode::SingleCycle);
    assert_eq!(tl.pose_at(0, 0.0).opacity, 0.0);
    assert!((tl.pose_at(0, 0.5).opacity - 0.5).abs() < 1e-12);
    assert_eq!(tl.pose_at(1, 2.0).opacity, 1.0);
    assert!((tl.pose_at(1, 3.25).opacity - 0.5).abs() < 1e-12);
    assert_eq!(tl.pose_at(1, 10.0).opacity, 0.0);
}

#[test]
fn cycling_restart_reproduces_the_first_entrance() {
    let tl = fade_timeline(PlaybackMode::Cycling);
    let period = tl.schedule().period_secs().unwrap();
    for t in [0.0, 0.2, 0.7] {
        assert!((tl.pose_at(0, t).opacity - tl.pose_at(0, t + period).opacity).abs() < 1e-9);
    }
}

#[test]
fn apply_writes_composed_state_to_the_target() {
    let tl = fade_timeline(PlaybackMode::SingleCycle);
    let mut surface = HeadlessSurface::new(Canvas::new(64, 64).unwrap());
    for p in tl.positions() {
        surface.create_element(ElementStyle {
            ch: p.ch,
            font_size: 20.0,
            font_weight: 400.0,
            font_family: None,
            color: StyleColor::white(),
        });
    }
    let cursor = tl.apply(0.5, &mut surface);
    assert_eq!(cursor.state, PlaybackState::Entering);
    let el = &surface.elements()[1];
    assert!((el.opacity - 0.5).abs() < 1e-12);
    assert_eq!(el.transform.x, 30.0);
    assert_eq!(el.transform.y, 50.0);
}

#[test]
fn static_visible_completes_at_rest() {
    let tl = Timeline::static_visible(vec![pos('a', 0.0)], 400.0);
    assert_eq!(tl.duration_secs(), Some(0.0));
    assert_eq!(tl.cursor_at(0.0).state, PlaybackState::Complete);
    assert_eq!(tl.pose_at(0, 0.0), Pose::rest(400.0));
}

use super::*;
use crate::foundation::core::Canvas;
use crate::layout::generator::{LayoutKind, LayoutOptions, calculate};
use crate::preset::color::StyleColor;
use crate::stage::headless::HeadlessSurface;
use crate::stage::surface::AnimationTarget;

fn preset() -> Preset {
    let mut p = Preset::new("test");
    p.styles.font_size = 40.0;
    p.styles.color = StyleColor::rgba(1.0, 0.0, 0.0, 1.0);
    p.styles.background = Some(StyleColor::white());
    p
}

#[test]
fn one_element_per_position_with_uniform_style() {
    let mut surface = HeadlessSurface::new(Canvas::default());
    let positions = calculate("HELLO", LayoutKind::Radial, &LayoutOptions::default()).unwrap();
    let n = Materializer::materialize(&mut surface, &positions, &preset()).unwrap();
    assert_eq!(n, 5);
    for (el, pos) in surface.elements().iter().zip(&positions) {
        assert_eq!(el.style.ch, pos.ch);
        assert_eq!(el.style.font_size, 40.0);
        assert_eq!(el.style.color, StyleColor::rgba(1.0, 0.0, 0.0, 1.0));
        assert_eq!(el.transform, CharTransform::at_rest(pos));
    }
    assert_eq!(surface.background(), Some(StyleColor::white()));
}

#[test]
fn repeated_calls_do_not_accumulate() {
    let mut surface = HeadlessSurface::new(Canvas::default());
    let opts = LayoutOptions::default();
    let a = calculate("HELLO", LayoutKind::Grid, &opts).unwrap();
    let b = calculate("HI", LayoutKind::Grid, &opts).unwrap();
    Materializer::materialize(&mut surface, &a, &preset()).unwrap();
    Materializer::materialize(&mut surface, &b, &preset()).unwrap();
    assert_eq!(surface.element_count(), 2);
}

#[test]
fn empty_text_clears_the_stage() {
    let mut surface = HeadlessSurface::new(Canvas::default());
    let a = calculate("ABC", LayoutKind::Grid, &LayoutOptions::default()).unwrap();
    Materializer::materialize(&mut surface, &a, &preset()).unwrap();
    assert_eq!(Materializer::materialize(&mut surface, &[], &preset()).unwrap(), 0);
    assert_eq!(surface.element_count(), 0);
}

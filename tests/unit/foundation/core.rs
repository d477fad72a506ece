use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30000, 1001).unwrap();
    assert!((fps.as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn fps_frame_conversions() {
    let fps = Fps::integer(30).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
    assert!((fps.frames_to_secs(90) - 3.0).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_round(3.0), 90);
    assert_eq!(fps.secs_to_frames_round(-1.0), 0);
}

#[test]
fn canvas_validates_bounds() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    let c = Canvas::new(64, 32).unwrap();
    assert_eq!(c.rgba_len(), 64 * 32 * 4);
    assert_eq!(c.center(), Point::new(32.0, 16.0));
}

#[test]
fn premul_round_trips_opaque_and_transparent() {
    let c = Rgba8Premul::from_straight_rgba(10, 20, 30, 255);
    assert_eq!(c.to_straight_rgba(), [10, 20, 30, 255]);
    assert_eq!(Rgba8Premul::transparent().to_straight_rgba(), [0, 0, 0, 0]);

    let half = Rgba8Premul::from_straight_rgba(200, 100, 0, 128);
    let back = half.to_straight_rgba();
    assert!((i32::from(back[0]) - 200).abs() <= 2);
    assert!((i32::from(back[1]) - 100).abs() <= 2);
    assert_eq!(back[3], 128);
}

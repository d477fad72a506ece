use super::*;

#[test]
fn keyframe_overrides_only_named_properties() {
    let mut kf = Keyframe::new();
    kf.insert(Property::Opacity, 0.0);
    kf.insert(Property::Y, 40.0);
    let p = Pose::rest(400.0).with_keyframe(&kf);
    assert_eq!(p.opacity, 0.0);
    assert_eq!(p.y, 40.0);
    assert_eq!(p.scale, 1.0);
    assert_eq!(p.weight, 400.0);
}

#[test]
fn get_and_set_cover_every_property() {
    let props = [
        Property::Opacity,
        Property::Scale,
        Property::ScaleX,
        Property::ScaleY,
        Property::X,
        Property::Y,
        Property::Rotation,
        Property::SkewX,
        Property::Blur,
        Property::Brightness,
        Property::HueRotate,
        Property::Glow,
        Property::Weight,
    ];
    let mut p = Pose::rest(400.0);
    for (i, prop) in props.iter().enumerate() {
        p.set(*prop, i as f64 + 0.5);
    }
    for (i, prop) in props.iter().enumerate() {
        assert_eq!(p.get(*prop), i as f64 + 0.5);
    }
}

#[test]
fn lerp_midpoint() {
    let a = Pose::rest(100.0);
    let mut b = Pose::rest(900.0);
    b.opacity = 0.0;
    b.rotation = 90.0;
    let m = Pose::lerp(&a, &b, 0.5);
    assert!((m.opacity - 0.5).abs() < 1e-12);
    assert!((m.rotation - 45.0).abs() < 1e-12);
    assert!((m.weight - 500.0).abs() < 1e-12);
}

#[test]
fn property_names_are_camel_case() {
    let kf: Keyframe =
        serde_json::from_value(serde_json::json!({"scaleX": 2.0, "hueRotate": 30.0})).unwrap();
    assert_eq!(kf.get(&Property::ScaleX), Some(&2.0));
    assert_eq!(kf.get(&Property::HueRotate), Some(&30.0));
}

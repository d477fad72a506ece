use super::*;

const ALL: &[&str] = &[
    "none",
    "power1.in",
    "power2.out",
    "power3.inOut",
    "power4.in",
    "sine.inOut",
    "expo.out",
    "circ.in",
    "back.out",
    "elastic.out",
    "bounce.out",
    "steps(4)",
];

#[test]
fn endpoints_are_exact() {
    for id in ALL {
        let e: Ease = id.parse().unwrap();
        assert!(e.apply(0.0).abs() < 1e-9, "{id} at 0");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-9, "{id} at 1");
    }
}

#[test]
fn input_is_clamped() {
    let e: Ease = "power2.out".parse().unwrap();
    assert_eq!(e.apply(-3.0), 0.0);
    assert_eq!(e.apply(7.0), 1.0);
}

#[test]
fn bare_family_defaults_to_out() {
    assert_eq!(
        "expo".parse::<Ease>().unwrap(),
        Ease::Expo(EaseDir::Out)
    );
    assert_eq!(
        "power2".parse::<Ease>().unwrap(),
        Ease::Power {
            degree: 2,
            dir: EaseDir::Out
        }
    );
}

#[test]
fn in_out_is_symmetric_at_midpoint() {
    for id in ["power1.inOut", "sine.inOut", "circ.inOut", "expo.inOut"] {
        let e: Ease = id.parse().unwrap();
        assert!((e.apply(0.5) - 0.5).abs() < 1e-9, "{id}");
    }
}

#[test]
fn power_out_matches_closed_form() {
    let e: Ease = "power1.out".parse().unwrap();
    let t = 0.3;
    assert!((e.apply(t) - (1.0 - (1.0 - t) * (1.0 - t))).abs() < 1e-12);
}

#[test]
fn back_overshoots() {
    let e: Ease = "back.out".parse().unwrap();
    let peak = (1..100)
        .map(|i| e.apply(f64::from(i) / 100.0))
        .fold(f64::MIN, f64::max);
    assert!(peak > 1.0);
}

#[test]
fn steps_quantize() {
    let e: Ease = "steps(4)".parse().unwrap();
    assert_eq!(e.apply(0.3), 0.25);
    assert_eq!(e.apply(0.99), 0.75);
}

#[test]
fn ids_round_trip_through_serde() {
    for id in ALL {
        let e: Ease = serde_json::from_value(serde_json::json!(id)).unwrap();
        let back = serde_json::to_value(e).unwrap();
        let again: Ease = serde_json::from_value(back).unwrap();
        assert_eq!(e, again);
    }
}

#[test]
fn unknown_names_are_rejected() {
    assert!("wobble.out".parse::<Ease>().is_err());
    assert!("power2.sideways".parse::<Ease>().is_err());
    assert!("steps(0)".parse::<Ease>().is_err());
}

#[test]
fn every_direction_lands_exactly_on_the_endpoints() {
    let dirs = [EaseDir::In, EaseDir::Out, EaseDir::InOut];
    let mut eases = vec![Ease::Linear, Ease::Steps(3)];
    for dir in dirs {
        eases.extend([
            Ease::Power { degree: 2, dir },
            Ease::Sine(dir),
            Ease::Expo(dir),
            Ease::Circ(dir),
            Ease::Back(dir),
            Ease::Elastic(dir),
            Ease::Bounce(dir),
        ]);
    }
    for e in eases {
        assert_eq!(e.apply(0.0), 0.0, "{e:?} at 0");
        assert_eq!(e.apply(1.0), 1.0, "{e:?} at 1");
    }
}

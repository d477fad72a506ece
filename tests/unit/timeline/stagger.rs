use super::*;
use crate::preset::model::TimeSpec;

fn spec(each: f64, from: StaggerOrigin) -> Stagger {
    Stagger::Spec {
        each: Some(TimeSpec::Seconds(each)),
        amount: None,
        from,
    }
}

#[test]
fn no_stagger_is_all_zero() {
    assert_eq!(stagger_delays(None, 3, 0).unwrap(), vec![0.0; 3]);
    assert!(stagger_delays(None, 0, 0).unwrap().is_empty());
}

#[test]
fn start_follows_index_order() {
    let s = Stagger::Each(TimeSpec::Text("100ms".into()));
    let d = stagger_delays(Some(&s), 4, 0).unwrap();
    for (i, v) in d.iter().enumerate() {
        assert!((v - 0.1 * i as f64).abs() < 1e-12);
    }
}

#[test]
fn end_reverses_order() {
    let d = stagger_delays(Some(&spec(1.0, StaggerOrigin::End)), 3, 0).unwrap();
    assert_eq!(d, vec![2.0, 1.0, 0.0]);
}

#[test]
fn center_is_monotonic_in_distance_from_middle() {
    for n in [1usize, 2, 5, 8, 11] {
        let d = stagger_delays(Some(&spec(0.1, StaggerOrigin::Center)), n, 0).unwrap();
        let mid = (n - 1) as f64 / 2.0;
        let mut idx: Vec<usize> = (0..n).collect();
        idx.sort_by(|a, b| {
            (*a as f64 - mid)
                .abs()
                .partial_cmp(&(*b as f64 - mid).abs())
                .unwrap()
        });
        for w in idx.windows(2) {
            assert!(d[w[0]] <= d[w[1]], "n={n}");
        }
    }
}

#[test]
fn edges_start_at_both_ends() {
    let d = stagger_delays(Some(&spec(1.0, StaggerOrigin::Edges)), 5, 0).unwrap();
    assert_eq!(d, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
}

#[test]
fn random_is_a_seeded_permutation() {
    let s = spec(1.0, StaggerOrigin::Random);
    let a = stagger_delays(Some(&s), 10, 42).unwrap();
    let b = stagger_delays(Some(&s), 10, 42).unwrap();
    assert_eq!(a, b);
    let mut sorted = a.clone();
    sorted.sort_by(|x, y| x.partial_cmp(y).unwrap());
    assert_eq!(sorted, (0..10).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn amount_spreads_across_the_largest_distance() {
    let s = Stagger::Spec {
        each: None,
        amount: Some(TimeSpec::Seconds(1.0)),
        from: StaggerOrigin::Start,
    };
    let d = stagger_delays(Some(&s), 5, 0).unwrap();
    assert_eq!(d.last().copied(), Some(1.0));
    assert_eq!(stagger_delays(Some(&s), 1, 0).unwrap(), vec![0.0]);
}

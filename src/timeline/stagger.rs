use crate::foundation::error::KinetypeResult;
use crate::foundation::math::Rng64;
use crate::preset::model::{Stagger, StaggerOrigin};

/// Distance of each index from the stagger origin.
///
/// `Start` and `End` count positions, `Center` is the distance to the middle index (fractional for
/// even counts), `Edges` is the distance from the nearest end, and `Random` assigns a seeded
/// permutation rank.
pub fn origin_distances(origin: StaggerOrigin, n: usize, seed: u64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let mid = (n - 1) as f64 / 2.0;
    match origin {
        StaggerOrigin::Start => (0..n).map(|i| i as f64).collect(),
        StaggerOrigin::End => (0..n).map(|i| (n - 1 - i) as f64).collect(),
        StaggerOrigin::Center => (0..n).map(|i| (i as f64 - mid).abs()).collect(),
        StaggerOrigin::Edges => (0..n).map(|i| mid - (i as f64 - mid).abs()).collect(),
        StaggerOrigin::Random => {
            let mut order: Vec<usize> = (0..n).collect();
            Rng64::new(seed).shuffle(&mut order);
            let mut rank = vec![0.0; n];
            for (r, &i) in order.iter().enumerate() {
                rank[i] = r as f64;
            }
            rank
        }
    }
}

/// Per-character start delay in seconds.
///
/// `each` multiplies the origin distance. `amount` spreads a total across the largest distance.
/// When both are given, `each` wins. No stagger means all zeros.
pub fn stagger_delays(stagger: Option<&Stagger>, n: usize, seed: u64) -> KinetypeResult<Vec<f64>> {
    let Some(stagger) = stagger else {
        return Ok(vec![0.0; n]);
    };
    let distances = origin_distances(stagger.origin(), n, seed);
    let max = distances.iter().copied().fold(0.0_f64, f64::max);

    let each = match stagger {
        Stagger::Each(t) => t.to_secs()?,
        Stagger::Spec {
            each: Some(each), ..
        } => each.to_secs()?,
        Stagger::Spec {
            each: None,
            amount: Some(amount),
            ..
        } => {
            let amount = amount.to_secs()?;
            if max > 0.0 { amount / max } else { 0.0 }
        }
        Stagger::Spec {
            each: None,
            amount: None,
            ..
        } => 0.0,
    };
    Ok(distances.into_iter().map(|d| d * each).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/stagger.rs"]
mod tests;

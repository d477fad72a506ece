use crate::foundation::core::Rect;
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::{Fnv1a64, Rng64};
use crate::preset::color::StyleColor;
use crate::preset::model::ParticleConfig;

/// One particle at a sampled instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Center x in canvas pixels.
    pub x: f64,
    /// Center y in canvas pixels.
    pub y: f64,
    /// Diameter in pixels.
    pub size: f64,
    /// Fill color.
    pub color: StyleColor,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Decorative particle system evaluated as a pure function of time.
///
/// Particle `i` lives through consecutive generations of length `lifetime`, offset so that the
/// field never respawns all at once. Each generation draws its spawn point, velocity, size and color
/// from a generator seeded by `(seed, i, generation)`, so sampling any `t` is reproducible.
#[derive(Clone, Debug)]
pub struct ParticleField {
    cfg: ParticleConfig,
    emitter: Rect,
    seed: u64,
}

impl ParticleField {
    /// Validate `cfg` and build a field emitting from `emitter`.
    pub fn new(cfg: ParticleConfig, emitter: Rect, seed: u64) -> KinetypeResult<Self> {
        if !cfg.lifetime.is_finite() || cfg.lifetime <= 0.0 {
            return Err(KinetypeError::validation("particle lifetime must be > 0"));
        }
        let ranges = [cfg.size[0], cfg.size[1], cfg.velocity[0], cfg.velocity[1], cfg.gravity];
        if ranges.iter().any(|v| !v.is_finite()) {
            return Err(KinetypeError::validation("particle ranges must be finite"));
        }
        if cfg.size[0] < 0.0 || cfg.size[1] < 0.0 {
            return Err(KinetypeError::validation("particle size must be >= 0"));
        }
        Ok(Self { cfg, emitter, seed })
    }

    /// Number of particles per sample.
    pub fn count(&self) -> usize {
        self.cfg.count as usize
    }

    /// Particle states at time `t` (seconds, negative clamps to 0).
    pub fn sample(&self, t: f64) -> Vec<Particle> {
        let t = t.max(0.0);
        let n = self.cfg.count;
        let life = self.cfg.lifetime;
        let mut out = Vec::with_capacity(n as usize);
        for i in 0..n {
            let offset = life * f64::from(i) / f64::from(n.max(1));
            let age_total = t + offset;
            let generation = (age_total / life).floor();
            let age = age_total - generation * life;

            let mut h = Fnv1a64::new_default();
            h.write_u64(self.seed);
            h.write_u64(u64::from(i));
            h.write_u64(generation as u64);
            let mut rng = Rng64::new(h.finish());

            let x0 = rng.range_f64(self.emitter.x0, self.emitter.x1);
            let y0 = rng.range_f64(self.emitter.y0, self.emitter.y1);
            let speed = rng.range_f64(self.cfg.velocity[0], self.cfg.velocity[1]);
            let angle = rng.range_f64(0.0, std::f64::consts::TAU);
            let size = rng.range_f64(self.cfg.size[0], self.cfg.size[1]);
            let color = if self.cfg.colors.is_empty() {
                StyleColor::white()
            } else {
                let k = (rng.next_u64() % self.cfg.colors.len() as u64) as usize;
                self.cfg.colors[k]
            };

            let (sin, cos) = angle.sin_cos();
            out.push(Particle {
                x: x0 + cos * speed * age,
                y: y0 + sin * speed * age + 0.5 * self.cfg.gravity * age * age,
                size,
                color,
                opacity: (1.0 - age / life).clamp(0.0, 1.0),
            });
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/particles.rs"]
mod tests;

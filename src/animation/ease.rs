use std::fmt;
use std::str::FromStr;

use crate::foundation::error::KinetypeError;

/// Direction variant of a named easing family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EaseDir {
    /// Slow start.
    In,
    /// Slow end.
    Out,
    /// Slow start and end.
    InOut,
}

/// Named easing curves mapping normalized progress to eased progress.
///
/// Curves are addressed by string ids such as `"power2.out"`, `"sine.inOut"`, `"back.in"`,
/// `"steps(4)"` or `"none"`. A bare family name (`"expo"`) means its `out` variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    /// Identity curve.
    Linear,
    /// Polynomial curve with exponent `degree + 1` (`power1` is quadratic).
    Power {
        /// Power family degree, 1 to 4.
        degree: u8,
        /// Curve direction.
        dir: EaseDir,
    },
    /// Quarter sine wave.
    Sine(EaseDir),
    /// Exponential.
    Expo(EaseDir),
    /// Circular arc.
    Circ(EaseDir),
    /// Overshooting curve.
    Back(EaseDir),
    /// Damped spring oscillation.
    Elastic(EaseDir),
    /// Bouncing ball.
    Bounce(EaseDir),
    /// Discrete jumps.
    Steps(u32),
}

impl Default for Ease {
    fn default() -> Self {
        Self::Power {
            degree: 1,
            dir: EaseDir::Out,
        }
    }
}

impl Ease {
    /// Apply this easing function to normalized progress `t` (clamped to `[0, 1]`).
    ///
    /// `Back` and `Elastic` may leave `[0, 1]` in between the endpoints. The endpoints
    /// themselves always map to exactly `0` and `1`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::Steps(n) => {
                if t >= 1.0 {
                    1.0
                } else {
                    let n = f64::from(n.max(1));
                    (t * n).floor() / n
                }
            }
            Self::Power { degree, dir } => {
                let p = i32::from(degree.clamp(1, 4)) + 1;
                directed(dir, t, |x| x.powi(p))
            }
            Self::Sine(dir) => directed(dir, t, |x| 1.0 - (x * std::f64::consts::FRAC_PI_2).cos()),
            Self::Expo(dir) => directed(dir, t, |x| {
                if x <= 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * x - 10.0)
                }
            }),
            Self::Circ(dir) => directed(dir, t, |x| 1.0 - (1.0 - x * x).max(0.0).sqrt()),
            Self::Back(dir) => directed(dir, t, |x| {
                const C1: f64 = 1.70158;
                const C3: f64 = C1 + 1.0;
                C3 * x * x * x - C1 * x * x
            }),
            Self::Elastic(dir) => directed(dir, t, |x| {
                if x <= 0.0 {
                    0.0
                } else if x >= 1.0 {
                    1.0
                } else {
                    let c4 = std::f64::consts::TAU / 3.0;
                    -(2f64.powf(10.0 * x - 10.0)) * ((x * 10.0 - 10.75) * c4).sin()
                }
            }),
            Self::Bounce(dir) => directed(dir, t, |x| 1.0 - bounce_out(1.0 - x)),
        }
    }

    /// Canonical string id, the inverse of [`Ease::from_str`].
    pub fn id(self) -> String {
        fn dir_name(dir: EaseDir) -> &'static str {
            match dir {
                EaseDir::In => "in",
                EaseDir::Out => "out",
                EaseDir::InOut => "inOut",
            }
        }

        match self {
            Self::Linear => "none".to_owned(),
            Self::Steps(n) => format!("steps({n})"),
            Self::Power { degree, dir } => format!("power{degree}.{}", dir_name(dir)),
            Self::Sine(dir) => format!("sine.{}", dir_name(dir)),
            Self::Expo(dir) => format!("expo.{}", dir_name(dir)),
            Self::Circ(dir) => format!("circ.{}", dir_name(dir)),
            Self::Back(dir) => format!("back.{}", dir_name(dir)),
            Self::Elastic(dir) => format!("elastic.{}", dir_name(dir)),
            Self::Bounce(dir) => format!("bounce.{}", dir_name(dir)),
        }
    }
}

/// Derive `out` and `inOut` variants from an `in` curve.
fn directed(dir: EaseDir, t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    match dir {
        EaseDir::In => ease_in(t),
        EaseDir::Out => 1.0 - ease_in(1.0 - t),
        EaseDir::InOut => {
            if t < 0.5 {
                ease_in(2.0 * t) / 2.0
            } else {
                1.0 - ease_in(2.0 - 2.0 * t) / 2.0
            }
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

impl FromStr for Ease {
    type Err = KinetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "none" || s == "linear" {
            return Ok(Self::Linear);
        }
        if let Some(inner) = s.strip_prefix("steps(").and_then(|r| r.strip_suffix(')')) {
            let n: u32 = inner.trim().parse().map_err(|_| {
                KinetypeError::validation(format!("invalid step count in ease '{s}'"))
            })?;
            if n == 0 {
                return Err(KinetypeError::validation("steps() ease needs at least 1 step"));
            }
            return Ok(Self::Steps(n));
        }

        let (family, dir) = match s.split_once('.') {
            Some((family, dir)) => (family, dir),
            None => (s, "out"),
        };
        let dir = match dir {
            "in" => EaseDir::In,
            "out" => EaseDir::Out,
            "inOut" | "inout" | "in-out" => EaseDir::InOut,
            other => {
                return Err(KinetypeError::validation(format!(
                    "unknown ease direction '{other}' in '{s}'"
                )));
            }
        };

        let ease = match family {
            "power0" => Self::Linear,
            "power1" | "quad" => Self::Power { degree: 1, dir },
            "power2" | "cubic" => Self::Power { degree: 2, dir },
            "power3" | "quart" => Self::Power { degree: 3, dir },
            "power4" | "quint" | "strong" => Self::Power { degree: 4, dir },
            "sine" => Self::Sine(dir),
            "expo" => Self::Expo(dir),
            "circ" => Self::Circ(dir),
            "back" => Self::Back(dir),
            "elastic" => Self::Elastic(dir),
            "bounce" => Self::Bounce(dir),
            other => {
                return Err(KinetypeError::validation(format!(
                    "unknown ease family '{other}'"
                )));
            }
        };
        Ok(ease)
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

impl serde::Serialize for Ease {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> serde::Deserialize<'de> for Ease {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::timeline::machine::PlaybackMode;

/// Environment variable consulted by [`MotionPreference::Auto`].
pub const REDUCED_MOTION_ENV: &str = "KINETYPE_REDUCED_MOTION";

/// Whether animations should collapse to near-instant reveals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPreference {
    /// Follow [`REDUCED_MOTION_ENV`] (`1`, `true`, `yes` or `reduce` turn it on).
    #[default]
    Auto,
    /// Always reduce motion.
    Always,
    /// Never reduce motion.
    Never,
}

impl MotionPreference {
    /// Resolve to a yes/no answer. `Auto` reads the environment on every call.
    pub fn resolve(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::env::var(REDUCED_MOTION_ENV)
                .map(|v| env_requests_reduced_motion(&v))
                .unwrap_or(false),
        }
    }
}

fn env_requests_reduced_motion(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "reduce"
    )
}

/// Engine-wide settings.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Capture frame rate.
    pub fps: Fps,
    /// Surface size.
    pub canvas: Canvas,
    /// Default playback mode for applied presets.
    pub mode: PlaybackMode,
    /// Default loop length in cycle modes, in seconds.
    pub hold_secs: f64,
    /// Pause between cycles in cycling mode, in seconds.
    pub inter_cycle_delay_secs: f64,
    /// Allows seeking unbounded timelines, clamped to this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_seek_horizon_secs: Option<f64>,
    /// Reduced-motion setting.
    pub reduced_motion: MotionPreference,
    /// Extra wall-clock time an export may take beyond its duration, in seconds.
    pub export_timeout_margin_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            canvas: Canvas::default(),
            mode: PlaybackMode::default(),
            hold_secs: 4.0,
            inter_cycle_delay_secs: 1.0,
            max_seek_horizon_secs: None,
            reduced_motion: MotionPreference::Auto,
            export_timeout_margin_secs: 5.0,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> KinetypeResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| KinetypeError::serde(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> KinetypeResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            KinetypeError::validation(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check value ranges.
    pub fn validate(&self) -> KinetypeResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        Canvas::new(self.canvas.width, self.canvas.height)?;
        let non_negative = [
            ("holdSecs", self.hold_secs),
            ("interCycleDelaySecs", self.inter_cycle_delay_secs),
            ("exportTimeoutMarginSecs", self.export_timeout_margin_secs),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(KinetypeError::validation(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        if let Some(h) = self.max_seek_horizon_secs
            && (!h.is_finite() || h <= 0.0)
        {
            return Err(KinetypeError::validation(format!(
                "maxSeekHorizonSecs must be finite and > 0, got {h}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;

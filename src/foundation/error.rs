/// Convenience result type used across kinetype.
pub type KinetypeResult<T> = Result<T, KinetypeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum KinetypeError {
    /// A preset name was requested that the catalog does not contain.
    #[error("preset not found: '{name}'")]
    PresetNotFound {
        /// Requested preset name.
        name: String,
    },

    /// A preset phase cannot be compiled into a timeline (for example zero keyframes).
    #[error("malformed preset '{preset}' (phase '{phase}'): {reason}")]
    MalformedPreset {
        /// Preset name.
        preset: String,
        /// Offending phase name.
        phase: String,
        /// Human readable reason.
        reason: String,
    },

    /// Layout computation failed on invalid geometry.
    #[error("layout error: {0}")]
    LayoutCompute(String),

    /// An export was requested while another export holds the capture slot.
    #[error("concurrent export: another export is already recording this surface")]
    ConcurrentExport,

    /// The recording/encoding primitive is missing or unsupported.
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    /// The export exceeded its wall-clock budget and was aborted.
    #[error(
        "export timeout: {elapsed_secs:.3}s elapsed, budget {budget_secs:.3}s ({frames_written} frames written)"
    )]
    ExportTimeout {
        /// Wall-clock seconds spent before aborting.
        elapsed_secs: f64,
        /// Configured wall-clock budget in seconds.
        budget_secs: f64,
        /// Frames handed to the sink before the abort.
        frames_written: u64,
    },

    /// The requested control operation is not meaningful for the current timeline.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid user-provided options or preset data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors raised by frame sinks while encoding.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinetypeError {
    /// Build a [`KinetypeError::PresetNotFound`] value.
    pub fn preset_not_found(name: impl Into<String>) -> Self {
        Self::PresetNotFound { name: name.into() }
    }

    /// Build a [`KinetypeError::MalformedPreset`] value.
    pub fn malformed_preset(
        preset: impl Into<String>,
        phase: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedPreset {
            preset: preset.into(),
            phase: phase.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`KinetypeError::LayoutCompute`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::LayoutCompute(msg.into())
    }

    /// Build a [`KinetypeError::CaptureUnavailable`] value.
    pub fn capture_unavailable(msg: impl Into<String>) -> Self {
        Self::CaptureUnavailable(msg.into())
    }

    /// Build a [`KinetypeError::InvalidOperation`] value.
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Build a [`KinetypeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KinetypeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`KinetypeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors that the engine recovers from with a fallback state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedPreset { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

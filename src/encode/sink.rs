use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::KinetypeResult;
use crate::render::backend::FrameRGBA;

/// Encoder quality tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Smallest output.
    Low,
    /// Balanced.
    #[default]
    Medium,
    /// Visually lossless for most content.
    High,
    /// Largest output.
    Ultra,
}

/// Configuration provided to a [`FrameSink`] when recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// Sink contract for consuming captured frames in timeline order.
///
/// `begin` is called once the first frame is already drawn, `push_frame` follows in strictly
/// increasing `FrameIndex` order, and the recording ends with exactly one of `end` or `abort`.
pub trait FrameSink: Send {
    /// Report whether this sink can record at all. Called before any frame work.
    fn check_available(&self) -> KinetypeResult<()> {
        Ok(())
    }
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> KinetypeResult<()>;
    /// Release everything without producing output.
    fn abort(&mut self) {}
    /// Encoded bytes produced by the recording, available after `end`.
    fn take_output(&mut self) -> KinetypeResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// In-memory sink for tests and debugging. Its output is the raw frames concatenated.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    pub(crate) frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Return `true` once `end` has run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> KinetypeResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.cfg = None;
    }

    fn take_output(&mut self) -> KinetypeResult<Vec<u8>> {
        let len = self.frames.iter().map(|(_, f)| f.data.len()).sum();
        let mut out = Vec::with_capacity(len);
        for (_, frame) in &self.frames {
            out.extend_from_slice(&frame.data);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;

use std::path::PathBuf;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameSink, Quality, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::foundation::math::flatten_premul_over_bg_to_opaque_rgba8;
use crate::render::backend::FrameRGBA;

/// NeuQuant sampling speed for a quality tier (1 is slowest and best, 30 fastest).
pub fn gif_speed_for(quality: Quality) -> i32 {
    match quality {
        Quality::Low => 30,
        Quality::Medium => 20,
        Quality::High => 10,
        Quality::Ultra => 1,
    }
}

/// Options for [`GifSink`].
#[derive(Clone, Debug)]
pub struct GifSinkOpts {
    /// Quality tier.
    pub quality: Quality,
    /// Also write the GIF to this file.
    pub out_path: Option<PathBuf>,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for GifSinkOpts {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            out_path: None,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Animated GIF sink built on the `image` crate. Frames are buffered and encoded in `end`.
#[derive(Debug)]
pub struct GifSink {
    opts: GifSinkOpts,
    cfg: Option<SinkConfig>,
    frames: Vec<RgbaImage>,
    last_idx: Option<FrameIndex>,
    output: Vec<u8>,
}

impl GifSink {
    /// Create a sink.
    pub fn new(opts: GifSinkOpts) -> Self {
        Self {
            opts,
            cfg: None,
            frames: Vec::new(),
            last_idx: None,
            output: Vec::new(),
        }
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> KinetypeResult<()> {
        if cfg.width == 0 || cfg.height == 0 || cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(KinetypeError::validation(
                "gif sink needs non-zero size and fps",
            ));
        }
        if cfg.width > u32::from(u16::MAX) || cfg.height > u32::from(u16::MAX) {
            return Err(KinetypeError::validation("gif frames are limited to 65535 pixels per side"));
        }
        self.cfg = Some(cfg);
        self.frames.clear();
        self.last_idx = None;
        self.output.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> KinetypeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| KinetypeError::encode("gif sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(KinetypeError::encode("gif sink received out-of-order frame index"));
        }
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(KinetypeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.last_idx = Some(idx);

        let mut rgba = vec![0u8; frame.data.len()];
        flatten_premul_over_bg_to_opaque_rgba8(&mut rgba, &frame.data, self.opts.bg_rgba)?;
        let img = RgbaImage::from_raw(frame.width, frame.height, rgba)
            .ok_or_else(|| KinetypeError::validation("frame.data size mismatch with width*height*4"))?;
        self.frames.push(img);
        Ok(())
    }

    fn end(&mut self) -> KinetypeResult<()> {
        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| KinetypeError::encode("gif sink not started"))?;
        let delay = Delay::from_numer_denom_ms(1000 * cfg.fps.den, cfg.fps.num);
        let frames: Vec<Frame> = std::mem::take(&mut self.frames)
            .into_iter()
            .map(|img| Frame::from_parts(img, 0, 0, delay))
            .collect();
        let count = frames.len();

        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buf, gif_speed_for(self.opts.quality));
            encoder
                .set_repeat(Repeat::Infinite)
                .map_err(|e| KinetypeError::encode(format!("gif repeat: {e}")))?;
            encoder
                .encode_frames(frames)
                .map_err(|e| KinetypeError::encode(format!("gif encode: {e}")))?;
        }

        if let Some(path) = &self.opts.out_path {
            use anyhow::Context as _;
            ensure_parent_dir(path)?;
            std::fs::write(path, &buf)
                .with_context(|| format!("write gif '{}'", path.display()))?;
        }
        tracing::debug!(frames = count, bytes = buf.len(), "gif encoded");
        self.output = buf;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.cfg = None;
    }

    fn take_output(&mut self) -> KinetypeResult<Vec<u8>> {
        Ok(std::mem::take(&mut self.output))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;

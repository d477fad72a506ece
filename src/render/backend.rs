use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::KinetypeResult;
use crate::render::cpu::{CpuSurface, CpuSurfaceOpts};
use crate::stage::headless::HeadlessSurface;
use crate::stage::surface::RenderSurface;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag is included to make this explicit
/// at API boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with one premultiplied color.
    pub fn solid(canvas: Canvas, color: Rgba8Premul) -> Self {
        let px = [color.r, color.g, color.b, color.a];
        let mut data = vec![0u8; canvas.rgba_len()];
        for chunk in data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        }
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data
            .get(i..i + 4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

/// Available surface kinds.
#[derive(Clone, Debug)]
pub enum SurfaceKind {
    /// Recording surface without rasterization.
    Headless,
    /// CPU raster surface powered by `vello_cpu`.
    Cpu(CpuSurfaceOpts),
}

/// Create a rendering surface implementation.
pub fn create_surface(kind: SurfaceKind, canvas: Canvas) -> KinetypeResult<Box<dyn RenderSurface>> {
    let canvas = Canvas::new(canvas.width, canvas.height)?;
    match kind {
        SurfaceKind::Headless => Ok(Box::new(HeadlessSurface::new(canvas))),
        SurfaceKind::Cpu(opts) => Ok(Box::new(CpuSurface::new(canvas, opts)?)),
    }
}

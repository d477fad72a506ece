use std::sync::Arc;

use crate::effects::particles::Particle;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::preset::color::StyleColor;
use crate::render::backend::FrameRGBA;
use crate::render::shaper::GlyphShaper;
use crate::stage::surface::{AnimationTarget, CharTransform, ElementStyle, FilterParams, RenderSurface};

/// Options for the CPU raster surface.
#[derive(Clone, Debug, Default)]
pub struct CpuSurfaceOpts {
    /// TrueType/OpenType font used for every element. Without it, elements draw as glyph cells.
    pub font_bytes: Option<Arc<Vec<u8>>>,
}

impl CpuSurfaceOpts {
    /// Return options drawing real glyphs from `bytes`.
    pub fn with_font_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.font_bytes = Some(Arc::new(bytes));
        self
    }
}

#[derive(Clone, Debug)]
struct CpuElement {
    style: ElementStyle,
    transform: CharTransform,
    opacity: f64,
    filter: FilterParams,
}

/// Rendering surface rasterized with `vello_cpu`.
///
/// Filters are approximated in vector space: brightness and hue rotation recolor the fill, glow
/// draws a scaled translucent halo behind the glyph, blur spreads offset translucent copies, and
/// weight above the base weight thickens strokes by overdrawing shifted copies.
pub struct CpuSurface {
    canvas: Canvas,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,
    shaper: Option<GlyphShaper>,
    background: Option<StyleColor>,
    elements: Vec<CpuElement>,
    particles: Vec<Particle>,
}

impl CpuSurface {
    /// Create a surface of the given size.
    pub fn new(canvas: Canvas, opts: CpuSurfaceOpts) -> KinetypeResult<Self> {
        let (w, h) = canvas_u16(canvas)?;
        let shaper = match opts.font_bytes {
            Some(bytes) => Some(GlyphShaper::new(bytes.as_ref().clone())?),
            None => None,
        };
        Ok(Self {
            canvas,
            ctx: None,
            pixmap: vello_cpu::Pixmap::new(w, h),
            shaper,
            background: None,
            elements: Vec::new(),
            particles: Vec::new(),
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> KinetypeResult<R>,
    ) -> KinetypeResult<R> {
        let (width, height) = canvas_u16(self.canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_particles(&self, ctx: &mut vello_cpu::RenderContext) {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        for p in &self.particles {
            if p.opacity <= 0.0 || p.size <= 0.0 {
                continue;
            }
            let mut c = p.color;
            c.a *= p.opacity;
            ctx.set_paint(paint_color(c));
            let r = p.size / 2.0;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(p.x - r, p.y - r, p.x + r, p.y + r));
        }
    }

    fn draw_element(
        &mut self,
        index: usize,
        ctx: &mut vello_cpu::RenderContext,
    ) -> KinetypeResult<()> {
        let Some(el) = self.elements.get(index).cloned() else {
            return Ok(());
        };
        if el.opacity <= 0.0 || el.style.ch.is_whitespace() {
            return Ok(());
        }
        let color = el
            .style
            .color
            .filtered(el.filter.brightness, el.filter.hue_rotate);
        let tr = el.transform.to_affine();
        let size = el.style.font_size;

        let opacity = el.opacity as f32;
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }

        if el.filter.glow > 0.0 {
            let halo = tr * Affine::scale(1.0 + 0.25 * el.filter.glow);
            let mut c = color;
            c.a *= 0.35 * el.filter.glow;
            self.fill_char(ctx, &el.style, halo, c, &[(0.0, 0.0)])?;
        }

        let blur = el.filter.blur.min(size);
        if blur > 0.5 {
            let d = blur / 2.0;
            let mut c = color;
            c.a *= 0.25;
            self.fill_char(ctx, &el.style, tr, c, &[(-d, 0.0), (d, 0.0), (0.0, -d), (0.0, d)])?;
        }

        let embolden = ((el.filter.weight - el.style.font_weight) / 500.0).clamp(0.0, 1.0);
        let dx = embolden * size * 0.03;
        if dx > 0.1 {
            self.fill_char(ctx, &el.style, tr, color, &[(-dx, 0.0), (0.0, 0.0), (dx, 0.0)])?;
        } else {
            self.fill_char(ctx, &el.style, tr, color, &[(0.0, 0.0)])?;
        }

        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn fill_char(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        style: &ElementStyle,
        tr: Affine,
        color: StyleColor,
        offsets: &[(f64, f64)],
    ) -> KinetypeResult<()> {
        ctx.set_paint(paint_color(color));
        match self.shaper.as_mut() {
            Some(shaper) => {
                let shaped = shaper.shape(style.ch, style.font_size as f32)?;
                let font = shaper.font().clone();
                for &(ox, oy) in offsets {
                    ctx.set_transform(affine_to_cpu(tr * Affine::translate(Vec2::new(ox, oy))));
                    let glyphs = shaped.glyphs.iter().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font)
                        .font_size(shaped.font_size)
                        .fill_glyphs(glyphs);
                }
            }
            None => {
                let (w, h) = (style.font_size * 0.6, style.font_size * 0.8);
                for &(ox, oy) in offsets {
                    ctx.set_transform(affine_to_cpu(tr * Affine::translate(Vec2::new(ox, oy))));
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("canvas", &self.canvas)
            .field("elements", &self.elements.len())
            .field("shaper", &self.shaper)
            .finish()
    }
}

impl AnimationTarget for CpuSurface {
    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn set_transform(&mut self, index: usize, transform: CharTransform) {
        if let Some(el) = self.elements.get_mut(index) {
            el.transform = transform;
        }
    }

    fn set_opacity(&mut self, index: usize, opacity: f64) {
        if let Some(el) = self.elements.get_mut(index) {
            el.opacity = opacity.clamp(0.0, 1.0);
        }
    }

    fn set_filter_params(&mut self, index: usize, params: FilterParams) {
        if let Some(el) = self.elements.get_mut(index) {
            el.filter = params;
        }
    }
}

impl RenderSurface for CpuSurface {
    fn size(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.particles.clear();
        self.background = None;
    }

    fn set_background(&mut self, color: Option<StyleColor>) {
        self.background = color;
    }

    fn create_element(&mut self, style: ElementStyle) -> usize {
        let weight = style.font_weight;
        self.elements.push(CpuElement {
            style,
            transform: CharTransform {
                x: 0.0,
                y: 0.0,
                rotation: 0.0,
                scale_x: 1.0,
                scale_y: 1.0,
                skew_x: 0.0,
            },
            opacity: 1.0,
            filter: FilterParams::neutral(weight),
        });
        self.elements.len() - 1
    }

    fn set_particles(&mut self, particles: &[Particle]) {
        self.particles.clear();
        self.particles.extend_from_slice(particles);
    }

    fn draw(&mut self) -> KinetypeResult<FrameRGBA> {
        self.pixmap.data_as_u8_slice_mut().fill(0);
        let mut pixmap = std::mem::replace(&mut self.pixmap, vello_cpu::Pixmap::new(1, 1));
        let res = self.with_ctx_mut(|this, ctx| {
            if let Some(bg) = this.background {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(paint_color(bg));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(this.canvas.width),
                    f64::from(this.canvas.height),
                ));
            }
            this.draw_particles(ctx);
            for i in 0..this.elements.len() {
                this.draw_element(i, ctx)?;
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        });
        let frame = FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        self.pixmap = pixmap;
        res.map(|()| frame)
    }
}

fn canvas_u16(canvas: Canvas) -> KinetypeResult<(u16, u16)> {
    let w = u16::try_from(canvas.width)
        .map_err(|_| KinetypeError::validation("canvas width exceeds u16"))?;
    let h = u16::try_from(canvas.height)
        .map_err(|_| KinetypeError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn paint_color(c: StyleColor) -> vello_cpu::peniko::Color {
    let to_u8 = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    vello_cpu::peniko::Color::from_rgba8(to_u8(c.r), to_u8(c.g), to_u8(c.b), to_u8(c.a))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

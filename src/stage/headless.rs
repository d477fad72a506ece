use crate::effects::particles::Particle;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::KinetypeResult;
use crate::preset::color::StyleColor;
use crate::render::backend::FrameRGBA;
use crate::stage::surface::{AnimationTarget, CharTransform, ElementStyle, FilterParams, RenderSurface};

/// Recorded state of one headless element.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessElement {
    /// Creation style.
    pub style: ElementStyle,
    /// Last transform written.
    pub transform: CharTransform,
    /// Last opacity written.
    pub opacity: f64,
    /// Last filter values written.
    pub filter: FilterParams,
}

/// Surface that records element state without rasterizing glyphs.
///
/// `draw` returns a frame filled with the background color. Every write through
/// [`AnimationTarget`] or the structural API bumps a mutation counter, which makes "nothing
/// touched the surface" observable in tests.
#[derive(Clone, Debug)]
pub struct HeadlessSurface {
    canvas: Canvas,
    background: Option<StyleColor>,
    elements: Vec<HeadlessElement>,
    particles: Vec<Particle>,
    mutations: u64,
    draws: u64,
}

impl HeadlessSurface {
    /// Empty surface of the given size.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            background: None,
            elements: Vec::new(),
            particles: Vec::new(),
            mutations: 0,
            draws: 0,
        }
    }

    /// Recorded elements in creation order.
    pub fn elements(&self) -> &[HeadlessElement] {
        &self.elements
    }

    /// Last particle set.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Background color, if any.
    pub fn background(&self) -> Option<StyleColor> {
        self.background
    }

    /// Total number of writes received.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    /// Number of `draw` calls.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }
}

impl AnimationTarget for HeadlessSurface {
    fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn set_transform(&mut self, index: usize, transform: CharTransform) {
        if let Some(el) = self.elements.get_mut(index) {
            el.transform = transform;
            self.mutations += 1;
        }
    }

    fn set_opacity(&mut self, index: usize, opacity: f64) {
        if let Some(el) = self.elements.get_mut(index) {
            el.opacity = opacity.clamp(0.0, 1.0);
            self.mutations += 1;
        }
    }

    fn set_filter_params(&mut self, index: usize, params: FilterParams) {
        if let Some(el) = self.elements.get_mut(index) {
            el.filter = params;
            self.mutations += 1;
        }
    }
}

impl RenderSurface for HeadlessSurface {
    fn size(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.particles.clear();
        self.background = None;
        self.mutations += 1;
    }

    fn set_background(&mut self, color: Option<StyleColor>) {
        self.background = color;
        self.mutations += 1;
    }

    fn create_element(&mut self, style: ElementStyle) -> usize {
        let weight = style.font_weight;
        self.elements.push(HeadlessElement {
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
        self.mutations += 1;
        self.elements.len() - 1
    }

    fn set_particles(&mut self, particles: &[Particle]) {
        self.particles.clear();
        self.particles.extend_from_slice(particles);
        self.mutations += 1;
    }

    fn draw(&mut self) -> KinetypeResult<FrameRGBA> {
        self.draws += 1;
        let bg = self
            .background
            .map(StyleColor::to_rgba8_premul)
            .unwrap_or_else(Rgba8Premul::transparent);
        Ok(FrameRGBA::solid(self.canvas, bg))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/headless.rs"]
mod tests;

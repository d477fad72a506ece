use crate::animation::pose::Pose;
use crate::effects::particles::Particle;
use crate::foundation::core::{Affine, Canvas, Vec2};
use crate::foundation::error::KinetypeResult;
use crate::layout::generator::CharacterPosition;
use crate::preset::color::StyleColor;
use crate::preset::model::PresetStyles;
use crate::render::backend::FrameRGBA;

/// Absolute 2D transform of one character element, in canvas pixels and degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharTransform {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Rotation in degrees, clockwise in screen space.
    pub rotation: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Horizontal skew in degrees.
    pub skew_x: f64,
}

impl CharTransform {
    /// Transform placing an element at its layout rest state.
    pub fn at_rest(pos: &CharacterPosition) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            rotation: pos.rotation,
            scale_x: pos.scale,
            scale_y: pos.scale,
            skew_x: 0.0,
        }
    }

    /// Compose a relative pose over a rest placement.
    pub fn compose(rest: &CharacterPosition, pose: &Pose) -> Self {
        Self {
            x: rest.x + pose.x,
            y: rest.y + pose.y,
            rotation: rest.rotation + pose.rotation,
            scale_x: rest.scale * pose.scale * pose.scale_x,
            scale_y: rest.scale * pose.scale * pose.scale_y,
            skew_x: pose.skew_x,
        }
    }

    /// Affine mapping element-local coordinates (origin at the glyph center) to canvas space.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::skew(self.skew_x.to_radians().tan(), 0.0)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// Per-element filter values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParams {
    /// Blur radius in pixels.
    pub blur: f64,
    /// Brightness multiplier.
    pub brightness: f64,
    /// Hue rotation in degrees.
    pub hue_rotate: f64,
    /// Glow strength in `[0, 1]`.
    pub glow: f64,
    /// Font weight.
    pub weight: f64,
}

impl FilterParams {
    /// Filter values carried by a pose.
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            blur: pose.blur.max(0.0),
            brightness: pose.brightness.max(0.0),
            hue_rotate: pose.hue_rotate,
            glow: pose.glow.clamp(0.0, 1.0),
            weight: pose.weight,
        }
    }

    /// Filters that leave the element unchanged at the given weight.
    pub fn neutral(weight: f64) -> Self {
        Self::from_pose(&Pose::rest(weight))
    }
}

/// Opacity of a pose composed over a rest placement, clamped to `[0, 1]`.
pub fn compose_opacity(rest: &CharacterPosition, pose: &Pose) -> f64 {
    (rest.opacity * pose.opacity).clamp(0.0, 1.0)
}

/// Style shared by all elements of one materialized text.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementStyle {
    /// The character drawn by this element.
    pub ch: char,
    /// Font size in pixels.
    pub font_size: f64,
    /// Base font weight.
    pub font_weight: f64,
    /// Font family hint.
    pub font_family: Option<String>,
    /// Fill color.
    pub color: StyleColor,
}

impl ElementStyle {
    /// Style for `ch` taken from preset styles.
    pub fn from_preset(ch: char, styles: &PresetStyles) -> Self {
        Self {
            ch,
            font_size: styles.font_size,
            font_weight: styles.font_weight,
            font_family: styles.font_family.clone(),
            color: styles.color,
        }
    }
}

/// Capability surface the timeline and playback controller may touch.
///
/// Indices address elements in creation order. Writes to out-of-range indices are ignored.
pub trait AnimationTarget {
    /// Number of live elements.
    fn element_count(&self) -> usize;
    /// Set an element's absolute transform.
    fn set_transform(&mut self, index: usize, transform: CharTransform);
    /// Set an element's opacity in `[0, 1]`.
    fn set_opacity(&mut self, index: usize, opacity: f64);
    /// Set an element's filter values.
    fn set_filter_params(&mut self, index: usize, params: FilterParams);
}

/// Full rendering surface. Structural calls (`clear`, `create_element`) belong to the materializer.
pub trait RenderSurface: AnimationTarget {
    /// Surface size in pixels.
    fn size(&self) -> Canvas;
    /// Remove every element and particle, and reset the background.
    fn clear(&mut self);
    /// Set the background painted behind elements (`None` = transparent).
    fn set_background(&mut self, color: Option<StyleColor>);
    /// Append an element and return its index.
    fn create_element(&mut self, style: ElementStyle) -> usize;
    /// Replace the decorative particle set.
    fn set_particles(&mut self, particles: &[Particle]);
    /// Rasterize the current state.
    fn draw(&mut self) -> KinetypeResult<FrameRGBA>;
}

#[cfg(test)]
#[path = "../../tests/unit/stage/surface.rs"]
mod tests;

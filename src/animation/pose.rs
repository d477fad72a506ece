use std::collections::BTreeMap;

/// Interpolation contract for animation value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` (may overshoot for elastic eases).
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Animatable per-character property addressed by keyframes.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    /// Opacity multiplier in `[0, 1]`.
    Opacity,
    /// Uniform scale factor.
    Scale,
    /// Horizontal scale factor.
    ScaleX,
    /// Vertical scale factor.
    ScaleY,
    /// Horizontal offset from the layout position, in pixels.
    X,
    /// Vertical offset from the layout position, in pixels.
    Y,
    /// Rotation offset in degrees.
    Rotation,
    /// Horizontal skew in degrees.
    SkewX,
    /// Blur radius in pixels.
    Blur,
    /// Brightness multiplier (1 = unchanged).
    Brightness,
    /// Hue rotation in degrees.
    HueRotate,
    /// Glow strength in `[0, 1]`.
    Glow,
    /// Font weight (variable-font `wght` axis).
    Weight,
}

/// One keyframe: an ordered map of properties to target values.
pub type Keyframe = BTreeMap<Property, f64>;

/// Relative animation state of one character, composed over its layout rest state.
///
/// Offsets (`x`, `y`, `rotation`, `skew_x`) add to the rest transform, scale factors multiply the
/// rest scale, `opacity` multiplies the rest opacity. Filter values are absolute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Opacity multiplier.
    pub opacity: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Horizontal offset in pixels.
    pub x: f64,
    /// Vertical offset in pixels.
    pub y: f64,
    /// Rotation offset in degrees.
    pub rotation: f64,
    /// Horizontal skew in degrees.
    pub skew_x: f64,
    /// Blur radius in pixels.
    pub blur: f64,
    /// Brightness multiplier.
    pub brightness: f64,
    /// Hue rotation in degrees.
    pub hue_rotate: f64,
    /// Glow strength.
    pub glow: f64,
    /// Font weight.
    pub weight: f64,
}

impl Pose {
    /// Resting pose for a given base font weight.
    pub fn rest(weight: f64) -> Self {
        Self {
            opacity: 1.0,
            scale: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            skew_x: 0.0,
            blur: 0.0,
            brightness: 1.0,
            hue_rotate: 0.0,
            glow: 0.0,
            weight,
        }
    }

    /// Read one property.
    pub fn get(&self, prop: Property) -> f64 {
        match prop {
            Property::Opacity => self.opacity,
            Property::Scale => self.scale,
            Property::ScaleX => self.scale_x,
            Property::ScaleY => self.scale_y,
            Property::X => self.x,
            Property::Y => self.y,
            Property::Rotation => self.rotation,
            Property::SkewX => self.skew_x,
            Property::Blur => self.blur,
            Property::Brightness => self.brightness,
            Property::HueRotate => self.hue_rotate,
            Property::Glow => self.glow,
            Property::Weight => self.weight,
        }
    }

    /// Write one property.
    pub fn set(&mut self, prop: Property, value: f64) {
        let slot = match prop {
            Property::Opacity => &mut self.opacity,
            Property::Scale => &mut self.scale,
            Property::ScaleX => &mut self.scale_x,
            Property::ScaleY => &mut self.scale_y,
            Property::X => &mut self.x,
            Property::Y => &mut self.y,
            Property::Rotation => &mut self.rotation,
            Property::SkewX => &mut self.skew_x,
            Property::Blur => &mut self.blur,
            Property::Brightness => &mut self.brightness,
            Property::HueRotate => &mut self.hue_rotate,
            Property::Glow => &mut self.glow,
            Property::Weight => &mut self.weight,
        };
        *slot = value;
    }

    /// Return a copy with every property of `kf` applied on top.
    pub fn with_keyframe(mut self, kf: &Keyframe) -> Self {
        for (&prop, &value) in kf {
            self.set(prop, value);
        }
        self
    }
}

impl Lerp for Pose {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let l = |x: f64, y: f64| <f64 as Lerp>::lerp(&x, &y, t);
        Self {
            opacity: l(a.opacity, b.opacity),
            scale: l(a.scale, b.scale),
            scale_x: l(a.scale_x, b.scale_x),
            scale_y: l(a.scale_y, b.scale_y),
            x: l(a.x, b.x),
            y: l(a.y, b.y),
            rotation: l(a.rotation, b.rotation),
            skew_x: l(a.skew_x, b.skew_x),
            blur: l(a.blur, b.blur),
            brightness: l(a.brightness, b.brightness),
            hue_rotate: l(a.hue_rotate, b.hue_rotate),
            glow: l(a.glow, b.glow),
            weight: l(a.weight, b.weight),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/pose.rs"]
mod tests;

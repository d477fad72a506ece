use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::layout::generator::CharacterPosition;
use crate::preset::model::Preset;
use crate::stage::surface::{CharTransform, ElementStyle, FilterParams, RenderSurface};

/// Creates one element per character on a surface.
///
/// This is the only place that calls the structural surface API.
#[derive(Clone, Copy, Debug, Default)]
pub struct Materializer;

impl Materializer {
    /// Clear `surface`, then create and place one element per position with the preset styles.
    ///
    /// Returns the number of elements created.
    #[tracing::instrument(skip(surface, positions, preset), fields(preset = %preset.name, chars = positions.len()))]
    pub fn materialize(
        surface: &mut dyn RenderSurface,
        positions: &[CharacterPosition],
        preset: &Preset,
    ) -> KinetypeResult<usize> {
        surface.clear();
        surface.set_background(preset.styles.background);

        let weight = preset.styles.font_weight;
        for pos in positions {
            let index = surface.create_element(ElementStyle::from_preset(pos.ch, &preset.styles));
            surface.set_transform(index, CharTransform::at_rest(pos));
            surface.set_opacity(index, pos.opacity);
            surface.set_filter_params(index, FilterParams::neutral(weight));
        }

        let created = surface.element_count();
        if created != positions.len() {
            return Err(KinetypeError::invalid_operation(format!(
                "surface holds {created} elements after materializing {} characters",
                positions.len()
            )));
        }
        tracing::debug!(created, "materialized characters");
        Ok(created)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/materializer.rs"]
mod tests;

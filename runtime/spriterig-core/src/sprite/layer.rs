//! Draw ordering of projected sprites

use super::projector::ProjectedSprite;

/// Order sprites for drawing, back to front
///
/// Sorts by the bone's layer (behind, middle, front) and then by the bone's
/// layer order. The sort is stable, so ties keep their input order.
pub fn sort_for_draw(mut sprites: Vec<ProjectedSprite>) -> Vec<ProjectedSprite> {
    sort_in_place(&mut sprites);
    sprites
}

pub fn sort_in_place(sprites: &mut [ProjectedSprite]) {
    sprites.sort_by_key(|sprite| (sprite.layer, sprite.layer_order));
}

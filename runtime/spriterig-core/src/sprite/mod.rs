//! Sprite rects, bone-attached instances, projection and draw ordering

mod instance;
mod layer;
mod projector;
mod rect;

pub use instance::SpriteInstance;
pub use layer::{sort_for_draw, sort_in_place};
pub use projector::{ProjectedSprite, project};
pub use rect::{SpriteQuad, SpriteRect};

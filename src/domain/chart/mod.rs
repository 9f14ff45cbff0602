//! Chart aggregate: layout value objects, pixel geometry and pointer interaction.

pub mod geometry;
pub mod interaction;
pub mod value_objects;

pub use geometry::*;
pub use interaction::*;
pub use value_objects::*;

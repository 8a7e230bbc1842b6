//! Domain ↔ viewport geometry and the shapes handed to the renderer

pub mod shape;
pub mod transform;

pub use shape::{PlotShape, ShapeOptions, build_shapes, grid_shapes, hit_test};
pub use transform::{PlotTransform, Viewport};

//! Orthogonal architecture canvas rendered onto an HTML5 2D context.

mod component;
mod render;

pub use component::{ArchitectureCanvas, COMPONENT_MIME};

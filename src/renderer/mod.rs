//! Render glue
//!
//! Turns game state into palette-indexed triangle batches plus projection
//! matrices. Drawing them is left to an external [`Renderer`].

pub mod frame;
pub mod geometry;
pub mod shapes;
pub mod vertex;

pub use frame::{Frame, FrameBuilder, GlyphQuad, MonoShaper, Renderer, TextShaper, build_static};
pub use geometry::{Geo, GeoError};
pub use vertex::{Color, Vertex, palette_texture};

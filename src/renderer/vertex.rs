//! Vertex format and palette for 2D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Vertex handed to the renderer
///
/// `position.z` only orders overlapping decorations. `color` is a palette
/// index stored as a float so the whole vertex is one attribute type.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: f32,
    pub uv: [f32; 2],
}

impl Vertex {
    /// Untextured vertex
    pub fn solid(p: Vec2, z: f32, color: Color) -> Self {
        Self {
            position: [p.x, p.y, z],
            color: color.index(),
            uv: [0.0, 0.0],
        }
    }

    /// Vertex sampling the glyph atlas at `uv`
    pub fn textured(p: Vec2, z: f32, color: Color, uv: Vec2) -> Self {
        Self {
            position: [p.x, p.y, z],
            color: color.index(),
            uv: uv.to_array(),
        }
    }
}

/// Fixed game palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Blue,
    Red,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Red,
        Color::Green,
        Color::Yellow,
    ];

    #[inline]
    pub fn index(self) -> f32 {
        self as u32 as f32
    }

    pub fn rgba(self) -> [f32; 4] {
        match self {
            Color::White => [1.00, 1.00, 1.00, 1.00],
            Color::Blue => [0.00, 0.47, 0.95, 1.00],
            Color::Red => [0.90, 0.16, 0.22, 1.00],
            Color::Green => [0.00, 0.89, 0.19, 1.00],
            Color::Yellow => [0.99, 0.98, 0.00, 1.00],
        }
    }
}

/// Texels of the 4x4 RGBA8 palette texture, indexed by [`Color::index`]
pub fn palette_texture() -> [u8; 4 * 4 * 4] {
    let mut texels = [0u8; 4 * 4 * 4];
    for (color, texel) in Color::ALL.iter().zip(texels.chunks_exact_mut(4)) {
        for (channel, out) in color.rgba().iter().zip(texel) {
            *out = (channel * 255.0).round() as u8;
        }
    }
    texels
}

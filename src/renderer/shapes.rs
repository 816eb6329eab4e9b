//! Shape generation for 2D primitives
//!
//! Every builder appends to a [`Geo`] batch and fails as a whole if the batch
//! is full.

use glam::Vec2;
use std::f32::consts::TAU;

use super::geometry::{Geo, GeoError};
use super::vertex::{Color, Vertex};
use crate::angle_vec;

/// Most segments a round shape may use
const MAX_SEGMENTS: usize = 32;

/// Filled circle as a triangle fan
pub fn circle(
    geo: &mut Geo,
    center: Vec2,
    z: f32,
    radius: f32,
    color: Color,
    segments: usize,
) -> Result<(), GeoError> {
    let segments = segments.clamp(3, MAX_SEGMENTS);
    let mut verts = Vec::with_capacity(segments + 1);
    verts.push(Vertex::solid(center, z, color));
    for i in 0..segments {
        let theta = i as f32 / segments as f32 * TAU;
        verts.push(Vertex::solid(center + angle_vec(theta) * radius, z, color));
    }

    let mut idxs = Vec::with_capacity(segments * 3);
    for i in 0..segments as u16 {
        idxs.extend_from_slice(&[0, 1 + i, 1 + (i + 1) % segments as u16]);
    }
    geo.push(&verts, &idxs)
}

/// Hollow circle band
pub fn ring(
    geo: &mut Geo,
    center: Vec2,
    z: f32,
    inner_radius: f32,
    outer_radius: f32,
    color: Color,
    segments: usize,
) -> Result<(), GeoError> {
    let segments = segments.clamp(3, MAX_SEGMENTS);
    let mut verts = Vec::with_capacity(segments * 2);
    for i in 0..segments {
        let dir = angle_vec(i as f32 / segments as f32 * TAU);
        verts.push(Vertex::solid(center + dir * inner_radius, z, color));
        verts.push(Vertex::solid(center + dir * outer_radius, z, color));
    }

    // Two triangles per segment
    let n = segments as u16;
    let mut idxs = Vec::with_capacity(segments * 6);
    for i in 0..n {
        let (inner1, outer1) = (2 * i, 2 * i + 1);
        let (inner2, outer2) = (2 * ((i + 1) % n), 2 * ((i + 1) % n) + 1);
        idxs.extend_from_slice(&[inner1, outer1, inner2, inner2, outer1, outer2]);
    }
    geo.push(&verts, &idxs)
}

/// Thick line segment
pub fn line(
    geo: &mut Geo,
    from: Vec2,
    to: Vec2,
    z: f32,
    width: f32,
    color: Color,
) -> Result<(), GeoError> {
    let dir = (to - from).normalize_or(Vec2::X);
    let perp = dir.perp() * (width * 0.5);
    geo.push_quad([
        Vertex::solid(from - perp, z, color),
        Vertex::solid(to - perp, z, color),
        Vertex::solid(to + perp, z, color),
        Vertex::solid(from + perp, z, color),
    ])
}

/// Axis-aligned rectangle
pub fn rect(geo: &mut Geo, min: Vec2, max: Vec2, z: f32, color: Color) -> Result<(), GeoError> {
    geo.push_quad([
        Vertex::solid(min, z, color),
        Vertex::solid(Vec2::new(max.x, min.y), z, color),
        Vertex::solid(max, z, color),
        Vertex::solid(Vec2::new(min.x, max.y), z, color),
    ])
}

/// Tree: trunk rectangle under a round canopy
pub fn tree(geo: &mut Geo, base: Vec2, z: f32) -> Result<(), GeoError> {
    rect(
        geo,
        base + Vec2::new(-0.12, 0.0),
        base + Vec2::new(0.12, 0.7),
        z,
        Color::Yellow,
    )?;
    circle(geo, base + Vec2::new(0.0, 1.2), z, 0.65, Color::Green, 10)
}

//! Bounded triangle batches
//!
//! Capacities are fixed up front and mirror the GPU buffers the batch is
//! uploaded into. Running out is an error, never a reallocation.

use thiserror::Error;

use super::vertex::Vertex;

/// Dynamic batch capacity (vertices)
pub const DYNAMIC_VERTS: usize = 1 << 10;
/// Dynamic batch capacity (indices)
pub const DYNAMIC_IDXS: usize = 1 << 11;
/// Static terrain batch capacity (vertices)
pub const STATIC_VERTS: usize = 1 << 14;
/// Static terrain batch capacity (indices)
pub const STATIC_IDXS: usize = 1 << 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("geometry {what} buffer overflow (capacity {capacity})")]
    Overflow {
        what: &'static str,
        capacity: usize,
    },
}

/// Indexed triangle list with fixed capacity
#[derive(Debug, Clone)]
pub struct Geo {
    pub verts: Vec<Vertex>,
    pub idxs: Vec<u16>,
    vert_cap: usize,
    idx_cap: usize,
}

impl Geo {
    pub fn with_capacity(vert_cap: usize, idx_cap: usize) -> Self {
        Self {
            verts: Vec::with_capacity(vert_cap),
            idxs: Vec::with_capacity(idx_cap),
            vert_cap: vert_cap.min(u16::MAX as usize + 1),
            idx_cap,
        }
    }

    /// Per-frame batch
    pub fn dynamic() -> Self {
        Self::with_capacity(DYNAMIC_VERTS, DYNAMIC_IDXS)
    }

    /// Batch for geometry that is built once
    pub fn terrain() -> Self {
        Self::with_capacity(STATIC_VERTS, STATIC_IDXS)
    }

    pub fn clear(&mut self) {
        self.verts.clear();
        self.idxs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }

    /// Append vertices with indices local to `verts`. Either everything fits
    /// or nothing is written.
    pub fn push(&mut self, verts: &[Vertex], idxs: &[u16]) -> Result<(), GeoError> {
        if self.verts.len() + verts.len() > self.vert_cap {
            return Err(GeoError::Overflow {
                what: "vertex",
                capacity: self.vert_cap,
            });
        }
        if self.idxs.len() + idxs.len() > self.idx_cap {
            return Err(GeoError::Overflow {
                what: "index",
                capacity: self.idx_cap,
            });
        }
        let base = self.verts.len() as u16;
        self.verts.extend_from_slice(verts);
        self.idxs.extend(idxs.iter().map(|i| base + i));
        Ok(())
    }

    /// Append a quad wound 0-1-2, 0-2-3
    pub fn push_quad(&mut self, corners: [Vertex; 4]) -> Result<(), GeoError> {
        self.push(&corners, &[0, 1, 2, 0, 2, 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::Color;
    use glam::Vec2;

    fn quad() -> [Vertex; 4] {
        [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y].map(|p| Vertex::solid(p, 0.0, Color::Blue))
    }

    #[test]
    fn test_quad_indices_are_offset() {
        let mut geo = Geo::dynamic();
        geo.push_quad(quad()).unwrap();
        geo.push_quad(quad()).unwrap();
        assert_eq!(geo.idxs, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_overflow_writes_nothing() {
        let mut geo = Geo::with_capacity(6, 64);
        geo.push_quad(quad()).unwrap();
        let err = geo.push_quad(quad()).unwrap_err();
        assert_eq!(
            err,
            GeoError::Overflow {
                what: "vertex",
                capacity: 6
            }
        );
        assert_eq!(geo.verts.len(), 4);
        assert_eq!(geo.idxs.len(), 6);

        let mut geo = Geo::with_capacity(64, 8);
        geo.push_quad(quad()).unwrap();
        assert!(matches!(
            geo.push_quad(quad()),
            Err(GeoError::Overflow { what: "index", .. })
        ));
    }
}

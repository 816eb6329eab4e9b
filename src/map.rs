//! Map provider
//!
//! A map is three lists: decorative trees, terrain collision circles and pot
//! spawn points. The packed `map.bytes` layout is one section per list, in
//! that order. Each section is a big-endian `u32` record count followed by the
//! records as little-endian `f32`s (trees and pots: x, y; circles: x, y, r).
//! Trailing sections may be left out.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("couldn't read map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{section} section truncated: needed {needed} bytes, {available} left")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("invalid JSON map: {0}")]
    Json(#[from] serde_json::Error),
}

/// Terrain collision circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f32,
}

impl From<[f32; 3]> for Circle {
    fn from([x, y, radius]: [f32; 3]) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius,
        }
    }
}

impl From<Circle> for [f32; 3] {
    fn from(c: Circle) -> Self {
        [c.pos.x, c.pos.y, c.radius]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapData {
    pub trees: Vec<Vec2>,
    pub circles: Vec<Circle>,
    pub pots: Vec<Vec2>,
}

/// Cursor over the packed sections
struct Sections<'a> {
    bytes: &'a [u8],
}

impl<'a> Sections<'a> {
    fn take(&mut self, section: &'static str, needed: usize) -> Result<&'a [u8], MapError> {
        if self.bytes.len() < needed {
            return Err(MapError::Truncated {
                section,
                needed,
                available: self.bytes.len(),
            });
        }
        let (head, rest) = self.bytes.split_at(needed);
        self.bytes = rest;
        Ok(head)
    }

    /// Next section as rows of `N` floats; empty if the data already ended
    fn rows<const N: usize>(&mut self, section: &'static str) -> Result<Vec<[f32; N]>, MapError> {
        if self.bytes.is_empty() {
            return Ok(Vec::new());
        }
        let count = self.take(section, 4)?;
        let count = u32::from_be_bytes([count[0], count[1], count[2], count[3]]) as usize;
        let body = self.take(section, count * N * 4)?;
        Ok(body
            .chunks_exact(N * 4)
            .map(|row| {
                std::array::from_fn(|i| {
                    let b = &row[i * 4..i * 4 + 4];
                    f32::from_le_bytes([b[0], b[1], b[2], b[3]])
                })
            })
            .collect())
    }
}

fn put_rows<const N: usize>(out: &mut Vec<u8>, rows: impl ExactSizeIterator<Item = [f32; N]>) {
    out.extend_from_slice(&(rows.len() as u32).to_be_bytes());
    for row in rows {
        for v in row {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }
}

impl MapData {
    /// Decode the packed `map.bytes` layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MapError> {
        let mut sections = Sections { bytes };
        let trees = sections.rows::<2>("trees")?;
        let circles = sections.rows::<3>("circles")?;
        let pots = sections.rows::<2>("pots")?;
        Ok(Self {
            trees: trees.into_iter().map(Vec2::from).collect(),
            circles: circles.into_iter().map(Circle::from).collect(),
            pots: pots.into_iter().map(Vec2::from).collect(),
        })
    }

    /// Encode into the packed `map.bytes` layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        put_rows(&mut out, self.trees.iter().map(|t| t.to_array()));
        put_rows(&mut out, self.circles.iter().map(|&c| <[f32; 3]>::from(c)));
        put_rows(&mut out, self.pots.iter().map(|p| p.to_array()));
        out
    }

    /// Parse the JSON layout: `{"trees": [[x, y]], "circles": [[x, y, r]], "pots": [[x, y]]}`
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a map file; `.json` files use the JSON layout, anything else the
    /// packed one
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let io_err = |source| MapError::Io {
            path: path.display().to_string(),
            source,
        };
        let map = if path.extension().is_some_and(|e| e == "json") {
            Self::from_json(&std::fs::read_to_string(path).map_err(io_err)?)?
        } else {
            Self::from_bytes(&std::fs::read(path).map_err(io_err)?)?
        };
        log::info!(
            "Loaded map {}: {} trees, {} circles, {} pots",
            path.display(),
            map.trees.len(),
            map.circles.len(),
            map.pots.len()
        );
        Ok(map)
    }

    /// Seeded demo map. Keeps a clearing around the origin where the player
    /// spawns.
    pub fn scatter(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let trees = (0..48).map(|_| ring(&mut rng, 4.0, 30.0)).collect();
        let circles = (0..10)
            .map(|_| Circle {
                pos: ring(&mut rng, 5.0, 24.0),
                radius: rng.random_range(0.6..2.0),
            })
            .collect();
        let pots = (0..8).map(|_| ring(&mut rng, 7.0, 20.0)).collect();
        log::debug!("Scattered demo map from seed {}", seed);
        Self {
            trees,
            circles,
            pots,
        }
    }
}

/// Uniform angle, distance in `[min, max)` from the origin
fn ring(rng: &mut Pcg32, min: f32, max: f32) -> Vec2 {
    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    crate::polar_to_cartesian(rng.random_range(min..max), theta)
}

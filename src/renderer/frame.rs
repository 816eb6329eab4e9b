//! Frame assembly
//!
//! Terrain is built once into a static batch. Everything that moves is
//! rebuilt every displayed frame from a read-only view of the game state.

use glam::{Mat4, Vec2};

use super::geometry::{Geo, GeoError};
use super::shapes;
use super::vertex::{Color, Vertex};
use crate::map::MapData;
use crate::platform::Viewport;
use crate::sim::anim;
use crate::sim::{Art, EncounterStatus, GameState, Waffle};

/// One glyph placed in pixel space, with its atlas rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub min: Vec2,
    pub max: Vec2,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

/// Lays out text against whatever glyph atlas the renderer baked
pub trait TextShaper {
    /// Append quads for `text`, starting at pixel `origin` on the baseline
    fn shape(&self, text: &str, origin: Vec2, out: &mut Vec<GlyphQuad>);
}

/// Fixed-cell shaper over an ASCII grid atlas (glyphs 32..128, row-major)
#[derive(Debug, Clone, Copy)]
pub struct MonoShaper {
    /// Glyph size in pixels
    pub cell: Vec2,
    pub columns: u32,
    pub rows: u32,
}

impl Default for MonoShaper {
    fn default() -> Self {
        Self {
            cell: Vec2::new(8.0, 16.0),
            columns: 16,
            rows: 6,
        }
    }
}

impl TextShaper for MonoShaper {
    fn shape(&self, text: &str, origin: Vec2, out: &mut Vec<GlyphQuad>) {
        let uv_cell = Vec2::new(1.0 / self.columns as f32, 1.0 / self.rows as f32);
        let mut x = origin.x;
        for c in text.chars() {
            let code = match c as u32 {
                code @ 32..128 => code - 32,
                _ => '?' as u32 - 32,
            };
            let cell = Vec2::new((code % self.columns) as f32, (code / self.columns) as f32);
            let uv_min = cell * uv_cell;
            out.push(GlyphQuad {
                min: Vec2::new(x, origin.y - self.cell.y),
                max: Vec2::new(x + self.cell.x, origin.y),
                uv_min,
                uv_max: uv_min + uv_cell,
            });
            x += self.cell.x;
        }
    }
}

/// Everything the renderer needs for one displayed frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Static batch, drawn with the world projection
    pub terrain: &'a Geo,
    /// Dynamic world-space batch
    pub world: &'a Geo,
    /// Screen-space overlay, drawn with the UI projection
    pub ui: &'a Geo,
    pub world_projection: Mat4,
    pub ui_projection: Mat4,
}

/// External drawing backend
pub trait Renderer {
    /// Receives the static batch once, before the first frame
    fn upload_static(&mut self, terrain: &Geo);
    fn draw(&mut self, frame: &Frame<'_>);
}

// Depth layers, smaller is closer
const Z_UI: f32 = 0.0;
const Z_PIPS: f32 = 0.2;
const Z_ITEMS: f32 = 0.4;
const Z_BODIES: f32 = 0.5;
const Z_SLOTS: f32 = 0.9;

/// Trees lower on screen sort in front of trees behind them
fn tree_depth(y: f32) -> f32 {
    (0.5 + y * 1.0e-3).clamp(0.05, 0.95)
}

/// Build the static terrain batch: rocks, then trees back to front
pub fn build_static(map: &MapData) -> Result<Geo, GeoError> {
    let mut geo = Geo::terrain();
    for rock in &map.circles {
        shapes::circle(&mut geo, rock.pos, Z_BODIES, rock.radius, Color::White, 20)?;
    }
    let mut trees = map.trees.clone();
    trees.sort_by(|a, b| b.y.total_cmp(&a.y));
    for t in trees {
        shapes::tree(&mut geo, t, tree_depth(t.y))?;
    }
    log::debug!(
        "Static batch: {} verts, {} indices",
        geo.verts.len(),
        geo.idxs.len()
    );
    Ok(geo)
}

/// Reusable per-frame batches
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    pub world: Geo,
    pub ui: Geo,
    glyphs: Vec<GlyphQuad>,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self {
            world: Geo::dynamic(),
            ui: Geo::dynamic(),
            glyphs: Vec::new(),
        }
    }
}

impl FrameBuilder {
    /// Rebuild both dynamic batches. On overflow the batch keeps whatever fit
    /// and the first error is returned.
    pub fn build(
        &mut self,
        state: &GameState,
        viewport: &Viewport,
        shaper: &dyn TextShaper,
    ) -> Result<(), GeoError> {
        self.world.clear();
        self.ui.clear();
        let world = self.build_world(state);
        let ui = self.build_ui(state, viewport, shaper);
        world.and(ui)
    }

    fn build_world(&mut self, state: &GameState) -> Result<(), GeoError> {
        let geo = &mut self.world;
        let tick = state.tick;

        if let Some(player) = state.player() {
            let slots = Waffle::slot_positions(player.pos, state.tuning.slot_radius);
            for (slot, occupant) in slots.iter().zip(state.waffle.slots) {
                let color = if occupant.is_some() {
                    Color::Green
                } else {
                    Color::White
                };
                shapes::ring(geo, *slot, Z_SLOTS, 0.12, 0.18, color, 8)?;
            }
        }

        for (edx, e) in state.pool.iter() {
            match e.art {
                Art::Player => {
                    shapes::circle(geo, e.pos, Z_BODIES, e.radius, Color::Blue, 16)?
                }
                Art::Pot => {
                    shapes::circle(geo, e.pos, Z_BODIES, e.radius, Color::Red, 16)?;
                    let status = state.waffle.status(&state.pool, edx);
                    if status == Some(EncounterStatus::Attacking) {
                        let outer = e.radius + 0.08;
                        shapes::ring(geo, e.pos, Z_BODIES, e.radius, outer, Color::Yellow, 16)?;
                    }
                }
                Art::Arrow => {
                    let tail = e.pos - e.facing * 0.45;
                    shapes::line(geo, tail, e.pos, Z_ITEMS, 0.08, Color::Yellow)?;
                }
                // Rocks live in the static batch
                Art::Rock | Art::None => {}
            }

            if let Some(spec) = anim::spec(e.item) {
                let pose = anim::item_pose(spec, &e.swing, tick, e.vel.length());
                let (pivot, dir) = pose.pose.place(e.pos, e.aim(tick));
                let color = if pose.instant {
                    Color::Yellow
                } else {
                    Color::White
                };
                shapes::line(geo, pivot, pivot + dir * spec.reach, Z_ITEMS, 0.1, color)?;
            }

            if e.mortal() {
                let (w, gap) = (0.18, 0.05);
                let span = e.max_hp as f32 * (w + gap) - gap;
                let origin = e.pos + Vec2::new(-span * 0.5, e.radius + 0.25);
                for i in 0..e.max_hp {
                    let min = origin + Vec2::new(i as f32 * (w + gap), 0.0);
                    let color = if i < e.hp { Color::Green } else { Color::Red };
                    shapes::rect(geo, min, min + Vec2::new(w, 0.1), Z_PIPS, color)?;
                }
            }
        }
        Ok(())
    }

    fn build_ui(
        &mut self,
        state: &GameState,
        viewport: &Viewport,
        shaper: &dyn TextShaper,
    ) -> Result<(), GeoError> {
        let lifetime = state.tuning.label_lifetime_ticks;
        for label in state.labels.live(state.tick, lifetime) {
            // Labels drift upward as they age
            let age = state.tick.saturating_sub(label.tick) as f32;
            let at = label.pos + Vec2::new(0.0, 0.8 + age * 0.02);
            let screen = viewport.world_to_screen(at, state.camera);
            self.text(shaper, &label.amount.to_string(), screen, Color::Red)?;
        }

        let hud = Vec2::new(20.0, 36.0);
        match state.player() {
            Some(p) => {
                let text = format!("HP {}/{}", p.hp, p.max_hp);
                self.text(shaper, &text, hud, Color::White)
            }
            None => self.text(shaper, "Press R to respawn", hud, Color::Yellow),
        }
    }

    fn text(
        &mut self,
        shaper: &dyn TextShaper,
        text: &str,
        origin: Vec2,
        color: Color,
    ) -> Result<(), GeoError> {
        self.glyphs.clear();
        shaper.shape(text, origin, &mut self.glyphs);
        for g in &self.glyphs {
            let corner = |x: bool, y: bool| {
                let p = Vec2::new(
                    if x { g.max.x } else { g.min.x },
                    if y { g.max.y } else { g.min.y },
                );
                let uv = Vec2::new(
                    if x { g.uv_max.x } else { g.uv_min.x },
                    if y { g.uv_max.y } else { g.uv_min.y },
                );
                Vertex::textured(p, Z_UI, color, uv)
            };
            self.ui.push_quad([
                corner(false, false),
                corner(true, false),
                corner(true, true),
                corner(false, true),
            ])?;
        }
        Ok(())
    }
}

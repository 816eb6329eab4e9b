//! Input handling
//!
//! Held keys persist across ticks; clicks, item picks and respawn requests are
//! one-shots consumed by the next tick.

use glam::{Mat4, Vec2, Vec3};

use crate::consts::WORLD_SCALE;
use crate::sim::{Item, TickInput};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Digit1,
    Digit2,
    R,
    Escape,
    Other,
}

impl Key {
    /// Unit movement contribution while held
    fn direction(self) -> Vec2 {
        match self {
            Key::W | Key::Up => Vec2::Y,
            Key::S | Key::Down => Vec2::NEG_Y,
            Key::A | Key::Left => Vec2::NEG_X,
            Key::D | Key::Right => Vec2::X,
            _ => Vec2::ZERO,
        }
    }
}

/// Raw event from the windowing backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Pointer button pressed at screen pixel coordinates (origin top-left)
    PointerDown { x: f32, y: f32 },
    Resize { width: f32, height: f32 },
}

/// Drawable size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

impl Viewport {
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    /// Pixel coordinates to normalized device coordinates (y up)
    pub fn screen_to_ndc(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * screen.x / self.width.max(1.0) - 1.0,
            1.0 - 2.0 * screen.y / self.height.max(1.0),
        )
    }

    /// Pixel coordinates to world coordinates around `camera`
    pub fn screen_to_world(&self, screen: Vec2, camera: Vec2) -> Vec2 {
        let ndc = self.screen_to_ndc(screen);
        camera + Vec2::new(ndc.x * WORLD_SCALE, ndc.y * WORLD_SCALE / self.aspect())
    }

    /// World coordinates around `camera` to pixel coordinates
    pub fn world_to_screen(&self, world: Vec2, camera: Vec2) -> Vec2 {
        let rel = world - camera;
        let ndc = Vec2::new(rel.x / WORLD_SCALE, rel.y * self.aspect() / WORLD_SCALE);
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }

    /// World space to clip space: `WORLD_SCALE` units per half-width, square
    /// pixels, centered on `camera`
    pub fn world_projection(&self, camera: Vec2) -> Mat4 {
        Mat4::from_scale(Vec3::new(
            1.0 / WORLD_SCALE,
            self.aspect() / WORLD_SCALE,
            1.0,
        )) * Mat4::from_translation((-camera).extend(0.0))
    }

    /// Pixel space (origin top-left) to clip space, for UI overlays
    pub fn ui_projection(&self) -> Mat4 {
        Mat4::orthographic_rh_gl(0.0, self.width, self.height, 0.0, -1.0, 1.0)
    }
}

/// Accumulated input between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: Vec<Key>,
    click: Option<Vec2>,
    select: Option<Item>,
    respawn: bool,
    quit: bool,
    pub viewport: Viewport,
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                match key {
                    Key::Digit1 => self.select = Some(Item::Sword),
                    Key::Digit2 => self.select = Some(Item::Bow),
                    Key::R => self.respawn = true,
                    Key::Escape => {
                        log::info!("Quit requested");
                        self.quit = true;
                    }
                    _ => {}
                }
                if !self.held.contains(&key) {
                    self.held.push(key);
                }
            }
            InputEvent::KeyUp(key) => self.held.retain(|&k| k != key),
            InputEvent::PointerDown { x, y } => self.click = Some(Vec2::new(x, y)),
            InputEvent::Resize { width, height } => {
                log::debug!("Viewport resized to {}x{}", width, height);
                self.viewport = Viewport { width, height };
            }
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// Sum of held movement keys, unnormalized
    pub fn move_dir(&self) -> Vec2 {
        self.held.iter().map(|k| k.direction()).sum()
    }

    /// Build the next tick's commands and clear one-shots
    pub fn take_tick_input(&mut self, camera: Vec2) -> TickInput {
        TickInput {
            move_dir: self.move_dir(),
            aim_at: self
                .click
                .take()
                .map(|p| self.viewport.screen_to_world(p, camera)),
            select: self.select.take(),
            respawn: std::mem::take(&mut self.respawn),
        }
    }
}

//! Top-level game driver
//!
//! Owns the simulation state, pending input, the fixed-timestep clock and the
//! render batches. A platform backend feeds it events, calls [`Game::frame`]
//! once per displayed frame, then [`Game::render`].

use crate::error::Result;
use crate::map::MapData;
use crate::platform::{InputEvent, InputState};
use crate::renderer::{Frame, FrameBuilder, Geo, Renderer, TextShaper, build_static};
use crate::sim::{FixedStep, GameState, tick};
use crate::tuning::Tuning;

pub struct Game {
    pub state: GameState,
    pub input: InputState,
    clock: FixedStep,
    terrain: Geo,
    frame: FrameBuilder,
    static_uploaded: bool,
}

impl Game {
    /// Spawn the map into a fresh world and build its terrain geometry
    pub fn new(tuning: Tuning, map: &MapData) -> Result<Self> {
        let mut state = GameState::new(tuning)?;
        state.populate(map)?;
        let terrain = build_static(map)?;
        log::info!("Game started with {} entities", state.pool.len());
        Ok(Self {
            state,
            input: InputState::default(),
            clock: FixedStep::default(),
            terrain,
            frame: FrameBuilder::default(),
            static_uploaded: false,
        })
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        self.input.apply(event);
    }

    pub fn quit_requested(&self) -> bool {
        self.input.quit_requested()
    }

    /// Run every tick that `elapsed_ms` of wall time makes due. Returns the
    /// number of ticks run.
    pub fn frame(&mut self, elapsed_ms: f64) -> u32 {
        let due = self.clock.advance(elapsed_ms);
        for _ in 0..due {
            let input = self.input.take_tick_input(self.state.camera);
            tick(&mut self.state, &input);
        }
        due
    }

    /// Hand the current state to `renderer`. Geometry that did not fit this
    /// frame is dropped with a warning.
    pub fn render(&mut self, renderer: &mut dyn Renderer, shaper: &dyn TextShaper) {
        if !self.static_uploaded {
            renderer.upload_static(&self.terrain);
            self.static_uploaded = true;
        }
        let viewport = self.input.viewport;
        if let Err(err) = self.frame.build(&self.state, &viewport, shaper) {
            log::warn!("Frame geometry truncated: {}", err);
        }
        renderer.draw(&Frame {
            terrain: &self.terrain,
            world: &self.frame.world,
            ui: &self.frame.ui,
            world_projection: viewport.world_projection(self.state.camera),
            ui_projection: viewport.ui_projection(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TICK_MS;
    use crate::platform::Key;
    use crate::renderer::MonoShaper;
    use glam::Vec2;

    #[derive(Default)]
    struct CountingRenderer {
        uploads: usize,
        draws: usize,
        last_ui_verts: usize,
    }

    impl Renderer for CountingRenderer {
        fn upload_static(&mut self, _terrain: &Geo) {
            self.uploads += 1;
        }

        fn draw(&mut self, frame: &Frame<'_>) {
            self.draws += 1;
            self.last_ui_verts = frame.ui.verts.len();
        }
    }

    #[test]
    fn test_frame_drains_whole_ticks() {
        let mut game = Game::new(Tuning::default(), &MapData::default()).unwrap();
        assert_eq!(game.frame(TICK_MS * 2.5), 2);
        assert_eq!(game.frame(TICK_MS * 0.6), 1);
        assert_eq!(game.state.tick, 3);
    }

    #[test]
    fn test_static_geometry_uploaded_once() {
        let mut game = Game::new(Tuning::default(), &MapData::scatter(3)).unwrap();
        let mut renderer = CountingRenderer::default();
        let shaper = MonoShaper::default();
        for _ in 0..3 {
            game.frame(TICK_MS);
            game.render(&mut renderer, &shaper);
        }
        assert_eq!(renderer.uploads, 1);
        assert_eq!(renderer.draws, 3);
        assert!(renderer.last_ui_verts > 0);
    }

    #[test]
    fn test_keys_move_player() {
        let mut game = Game::new(Tuning::default(), &MapData::default()).unwrap();
        game.handle_event(InputEvent::KeyDown(Key::D));
        game.frame(TICK_MS * 10.0);
        game.handle_event(InputEvent::KeyUp(Key::D));
        let p = game.state.player().unwrap();
        assert!(p.pos.x > 0.0);
        assert_eq!(p.pos.y, 0.0);
        assert!(game.state.camera.x > 0.0);
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut game = Game::new(Tuning::default(), &MapData::default()).unwrap();
        assert!(!game.quit_requested());
        game.handle_event(InputEvent::KeyDown(Key::Escape));
        assert!(game.quit_requested());
    }

    #[test]
    fn test_click_swings_toward_pointer() {
        let mut game = Game::new(Tuning::default(), &MapData::default()).unwrap();
        // Straight below screen center
        game.handle_event(InputEvent::PointerDown { x: 320.0, y: 470.0 });
        game.frame(TICK_MS);
        let p = game.state.player().unwrap();
        assert!(p.swing.in_progress(game.state.tick));
        assert!(p.facing.dot(Vec2::NEG_Y) > 0.99);
    }
}

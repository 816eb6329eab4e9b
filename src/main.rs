//! Pot Waffle entry point
//!
//! Headless native runner: loads an optional map and tuning file, then plays
//! a short scripted session through the fixed-timestep loop with a renderer
//! that only logs what it would draw.
//!
//! Usage: `pot-waffle [MAP(.bytes|.json)] [TUNING.json]`

use std::process::ExitCode;

use pot_waffle::consts::TICK_MS;
use pot_waffle::map::MapData;
use pot_waffle::platform::{InputEvent, Key};
use pot_waffle::renderer::{Frame, Geo, MonoShaper, Renderer};
use pot_waffle::{Game, Tuning};

/// Seed for the demo map used when no map file is given
const DEMO_SEED: u64 = 0x5EED;

/// Frames to run before giving up on the script
const MAX_FRAMES: u32 = 60 * 60;

#[derive(Default)]
struct LogRenderer {
    frames: u32,
}

impl Renderer for LogRenderer {
    fn upload_static(&mut self, terrain: &Geo) {
        log::info!(
            "Static terrain: {} vertices, {} indices",
            terrain.verts.len(),
            terrain.idxs.len()
        );
    }

    fn draw(&mut self, frame: &Frame<'_>) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            log::debug!(
                "Frame {}: {} world vertices, {} UI vertices",
                self.frames,
                frame.world.verts.len(),
                frame.ui.verts.len()
            );
        }
    }
}

/// Scripted input, keyed by frame number
fn script(frame: u32) -> Vec<InputEvent> {
    match frame {
        1 => vec![InputEvent::Resize {
            width: 1280.0,
            height: 720.0,
        }],
        2 => vec![InputEvent::KeyDown(Key::D), InputEvent::KeyDown(Key::W)],
        90 => vec![InputEvent::KeyUp(Key::W)],
        120 => vec![InputEvent::PointerDown { x: 900.0, y: 360.0 }],
        180 => vec![InputEvent::KeyUp(Key::D), InputEvent::KeyDown(Key::Digit2)],
        200 => vec![InputEvent::PointerDown { x: 640.0, y: 100.0 }],
        260 => vec![InputEvent::KeyDown(Key::R)],
        300 => vec![InputEvent::KeyDown(Key::Escape)],
        _ => Vec::new(),
    }
}

fn run() -> pot_waffle::error::Result<()> {
    let mut args = std::env::args().skip(1);
    let map = match args.next() {
        Some(path) => MapData::load(path)?,
        None => MapData::scatter(DEMO_SEED),
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    let mut game = Game::new(tuning, &map)?;
    let mut renderer = LogRenderer::default();
    let shaper = MonoShaper::default();

    let mut ticks = 0;
    for frame in 1..=MAX_FRAMES {
        for event in script(frame) {
            game.handle_event(event);
        }
        if game.quit_requested() {
            break;
        }
        ticks += game.frame(TICK_MS);
        game.render(&mut renderer, &shaper);
    }

    log::info!(
        "Session over after {} ticks: {} entities live, player {}",
        ticks,
        game.state.pool.len(),
        if game.state.player().is_some() {
            "alive"
        } else {
            "dead"
        }
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Pot Waffle (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

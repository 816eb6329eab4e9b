//! Platform abstraction layer
//!
//! Windowing backends deliver raw key and pointer events; this layer turns
//! them into per-tick commands and maps screen space to world space.

pub mod input;

pub use input::{InputEvent, InputState, Key, Viewport};

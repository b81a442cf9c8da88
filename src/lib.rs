//! hxv - byte grid viewer
//!
//! Windowing and rendering engine for inspecting large binary blobs as a grid
//! of hex digits and decoded glyphs, plus the terminal viewer built on it.

pub mod app;
pub mod buffer;
pub mod config;
pub mod encoding;
pub mod logging;
pub mod ui;
pub mod view;

//! Windowing and rendering over a byte source.

mod frame;
mod selection;
mod viewport;

pub use frame::{Cell, FrameBuilder, RenderFrame};
pub use selection::{GridCell, Pane, SelectionDelta, SelectionKey, SelectionSync};
pub use viewport::Viewport;

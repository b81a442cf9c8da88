mod hex_view;

pub use hex_view::{frame_lines, HexView};

use ratatui::style::Color;

/// Viewer palette
pub struct Colors;

impl Colors {
    pub const HEADER: Color = Color::Cyan;
    pub const ADDR: Color = Color::DarkGray;
    /// Accent for even columns
    pub const GROUP_EVEN: Color = Color::Rgb(0xCC, 0x44, 0x44);
    /// Accent for odd columns
    pub const GROUP_ODD: Color = Color::Rgb(0x55, 0x77, 0xDD);
    pub const SELECTION_FG: Color = Color::Black;
    pub const SELECTION_BG: Color = Color::Rgb(0xDD, 0xDD, 0x55);
    pub const FOCUS_FG: Color = Color::White;
    pub const FOCUS_BG: Color = Color::Red;
    pub const STATUS_FG: Color = Color::White;
    pub const STATUS_BG: Color = Color::DarkGray;
}

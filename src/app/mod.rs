mod session;
mod state;

pub use session::{format_offset, Session};
pub use state::App;

use crossterm::event::KeyCode;

/// Hex entry takes two keystrokes per byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Normal,
    /// First nibble typed
    HexFirstDigit(u8),
}

/// Viewer actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,

    // Window navigation (wheel/arrow semantics: up lowers the offset)
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GotoBeginning,
    GotoEnd,

    // Focused cell
    FocusUp,
    FocusDown,
    FocusLeft,
    FocusRight,
    SwitchPane,

    // Focus movement that also extends the selection
    SelectUp,
    SelectDown,
    SelectLeft,
    SelectRight,

    // Selection
    ToggleSelect,
    ClearSelection,

    // Editing
    InputHex(u8),
    Flush,

    CycleCodePage,

    None,
}

/// Key modifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMod {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Action {
    /// Map a key press to an action
    pub fn from_key(key: KeyCode, mods: KeyMod) -> Self {
        let KeyMod { ctrl, shift, alt } = mods;

        match (key, ctrl, alt) {
            // Shift+arrows: select while moving
            (KeyCode::Up, false, false) if shift => Action::SelectUp,
            (KeyCode::Down, false, false) if shift => Action::SelectDown,
            (KeyCode::Left, false, false) if shift => Action::SelectLeft,
            (KeyCode::Right, false, false) if shift => Action::SelectRight,

            (KeyCode::Char('c'), true, false) => Action::Quit,
            (KeyCode::Char('q'), false, false) => Action::Quit,
            (KeyCode::Esc, _, _) => Action::ClearSelection,

            // Window
            (KeyCode::Up, false, false) => Action::ScrollUp,
            (KeyCode::Down, false, false) => Action::ScrollDown,
            (KeyCode::PageUp, _, _) => Action::PageUp,
            (KeyCode::PageDown, _, _) => Action::PageDown,
            (KeyCode::Char('v'), false, true) => Action::PageUp,
            (KeyCode::Char('v'), true, false) => Action::PageDown,
            (KeyCode::Home, _, _) => Action::GotoBeginning,
            (KeyCode::End, _, _) => Action::GotoEnd,
            (KeyCode::Char('<'), false, true) => Action::GotoBeginning,
            (KeyCode::Char('>'), false, true) => Action::GotoEnd,

            // Focus
            (KeyCode::Left, false, false) => Action::FocusLeft,
            (KeyCode::Right, false, false) => Action::FocusRight,
            (KeyCode::Up, true, false) => Action::FocusUp,
            (KeyCode::Down, true, false) => Action::FocusDown,
            (KeyCode::Char('b'), true, false) => Action::FocusLeft,
            (KeyCode::Char('f'), true, false) => Action::FocusRight,
            (KeyCode::Char('p'), true, false) => Action::FocusUp,
            (KeyCode::Char('n'), true, false) => Action::FocusDown,
            (KeyCode::Char('h'), false, false) => Action::FocusLeft,
            (KeyCode::Char('l'), false, false) => Action::FocusRight,
            (KeyCode::Char('k'), false, false) => Action::FocusUp,
            (KeyCode::Char('j'), false, false) => Action::FocusDown,
            (KeyCode::Tab, false, false) => Action::SwitchPane,

            (KeyCode::Char(' '), false, false) => Action::ToggleSelect,
            (KeyCode::Char('s'), true, false) => Action::Flush,
            (KeyCode::F(2), false, false) => Action::CycleCodePage,

            (KeyCode::Char(ch), false, false) => match ch.to_digit(16) {
                Some(digit) => Action::InputHex(digit as u8),
                None => Action::None,
            },

            _ => Action::None,
        }
    }
}

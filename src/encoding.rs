//! Single-byte code pages for the character pane.
//!
//! Every byte decodes to exactly one `char`. Control bytes in
//! [`NON_PRINTABLE`] are replaced with a space before decoding.

use std::fmt;
use std::str::FromStr;

use encoding_rs::{Encoding, IBM866, ISO_8859_2, WINDOWS_1252};

/// NUL, BEL, BS, TAB, LF, CR
pub const NON_PRINTABLE: [u8; 6] = [0x00, 0x07, 0x08, 0x09, 0x0A, 0x0D];

/// Glyph used by the `encoding_rs` pages for bytes that decode to a control character
const PLACEHOLDER: char = '.';

/// CP437 glyphs for 0x00..=0x1F (the graphical set, not the C0 controls)
const CP437_LOW: [char; 32] = [
    '\u{0020}', '☺', '☻', '♥', '♦', '♣', '♠', '•', '◘', '○', '◙', '♂', '♀', '♪', '♫', '☼',
    '►', '◄', '↕', '‼', '¶', '§', '▬', '↨', '↑', '↓', '→', '←', '∟', '↔', '▲', '▼',
];

/// CP437 glyphs for 0x80..=0xFF
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Code page used to turn a byte into a glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodePage {
    /// IBM PC / DOS (OEM 437)
    #[default]
    Cp437,
    Windows1252,
    Ibm866,
    Iso8859_2,
}

impl CodePage {
    pub const ALL: [CodePage; 4] = [
        CodePage::Cp437,
        CodePage::Windows1252,
        CodePage::Ibm866,
        CodePage::Iso8859_2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CodePage::Cp437 => "cp437",
            CodePage::Windows1252 => "windows-1252",
            CodePage::Ibm866 => "ibm866",
            CodePage::Iso8859_2 => "iso-8859-2",
        }
    }

    /// Next code page in [`CodePage::ALL`], wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&cp| cp == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn encoding(&self) -> Option<&'static Encoding> {
        match self {
            CodePage::Cp437 => None,
            CodePage::Windows1252 => Some(WINDOWS_1252),
            CodePage::Ibm866 => Some(IBM866),
            CodePage::Iso8859_2 => Some(ISO_8859_2),
        }
    }

    /// Decode one byte without any substitution
    pub fn decode(&self, byte: u8) -> char {
        let Some(encoding) = self.encoding() else {
            return match byte {
                0x00..=0x1F => CP437_LOW[byte as usize],
                0x7F => '\u{2302}',
                0x80..=0xFF => CP437_HIGH[(byte - 0x80) as usize],
                _ => byte as char,
            };
        };

        let bytes = [byte];
        let (text, _had_errors) = encoding.decode_without_bom_handling(&bytes);
        match text.chars().next() {
            Some(ch) if !ch.is_control() => ch,
            _ => PLACEHOLDER,
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CodePage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "cp437" | "437" | "oem" | "dos" => Ok(CodePage::Cp437),
            "windows-1252" | "cp1252" | "1252" => Ok(CodePage::Windows1252),
            "ibm866" | "cp866" | "866" => Ok(CodePage::Ibm866),
            "iso-8859-2" | "latin2" => Ok(CodePage::Iso8859_2),
            _ => Err(format!(
                "unknown code page '{}' (expected one of: {})",
                s,
                CodePage::ALL.map(|cp| cp.name()).join(", ")
            )),
        }
    }
}

/// Glyph shown in the character pane for `byte`
pub fn display_char(byte: u8, code_page: CodePage) -> char {
    let byte = if NON_PRINTABLE.contains(&byte) { b' ' } else { byte };
    code_page.decode(byte)
}

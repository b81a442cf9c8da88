//! Command-line configuration for the `hxv` viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::encoding::CodePage;

/// Largest supported row width
pub const MAX_COLUMNS: usize = 256;

/// Terminal hex viewer with synchronized hex and text panes
#[derive(Parser, Debug, Clone)]
#[command(name = "hxv")]
#[command(author, version, about, long_about = None)]
pub struct ViewerConfig {
    /// File to open (reads stdin when omitted and stdin is piped)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Bytes per row
    #[arg(short, long, default_value = "16", value_parser = parse_columns)]
    pub columns: usize,

    /// Map the file read-write so edits land in place
    #[arg(short, long)]
    pub writable: bool,

    /// Code page for the text pane (cp437, windows-1252, ibm866, iso-8859-2)
    #[arg(short, long, default_value = "cp437")]
    pub encoding: CodePage,

    /// Initial offset (hex with 0x prefix, or decimal)
    #[arg(short, long, default_value = "0", value_parser = parse_offset)]
    pub offset: usize,

    /// Print ROWS rows to stdout and exit instead of starting the viewer
    #[arg(long, value_name = "ROWS", num_args = 0..=1, default_missing_value = "16")]
    pub dump: Option<usize>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Parse a column count in `1..=MAX_COLUMNS`
pub fn parse_columns(s: &str) -> Result<usize, String> {
    let columns: usize = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid column count: {}", e))?;
    if (1..=MAX_COLUMNS).contains(&columns) {
        Ok(columns)
    } else {
        Err(format!("column count must be between 1 and {}", MAX_COLUMNS))
    }
}

/// Parse an offset (hex with 0x prefix or decimal)
pub fn parse_offset(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| format!("invalid hex offset: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid offset: {}", e))
    }
}

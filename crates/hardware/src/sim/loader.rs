//! Program loader for the hex-byte text format.
//!
//! A program file carries one hex byte per line. Lines starting with `#` or
//! `/` are comments; blank lines and surrounding whitespace are ignored;
//! lines that do not parse as a hex byte are skipped. The resulting bytes
//! are packed little-endian into instruction memory words.

use std::fs;
use std::io;
use std::path::Path;

/// Parses program text into its byte image.
pub fn parse_hex_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('/') {
            continue;
        }
        if let Ok(byte) = u8::from_str_radix(line, 16) {
            bytes.push(byte);
        }
    }
    bytes
}

/// Reads and parses a program file.
///
/// The I/O error is returned to the caller; the CLI turns it into a
/// non-zero exit.
pub fn load_hex_file(path: &Path) -> io::Result<Vec<u8>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_hex_bytes(&text))
}

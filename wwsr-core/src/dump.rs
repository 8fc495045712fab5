//! Raw station memory dumps.
//!
//! Range syntax: `[address][:size]`, each number decimal or `0x`-prefixed
//! hex. Missing address means 0, missing size means 0x100.

use std::fmt::Write as _;

use crate::types::{Result, WwsrError};

pub const DEFAULT_DUMP_SIZE: u16 = 0x100;
pub const DEFAULT_DUMP_WIDTH: usize = 16;

/// A span of station memory to dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpRange {
    pub address: u16,
    pub size: u16,
}

impl Default for DumpRange {
    fn default() -> Self {
        DumpRange {
            address: 0,
            size: DEFAULT_DUMP_SIZE,
        }
    }
}

impl DumpRange {
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || WwsrError::InvalidDumpRange(text.to_string());
        let text = text.trim();

        let (address, size) = match text.split_once(':') {
            Some((a, s)) => (a, Some(s)),
            None => (text, None),
        };

        let address = if address.is_empty() {
            0
        } else {
            parse_number(address).ok_or_else(invalid)?
        };
        let size = match size {
            Some(s) if !s.is_empty() => parse_number(s).ok_or_else(invalid)?,
            _ => DEFAULT_DUMP_SIZE,
        };

        Ok(DumpRange { address, size })
    }
}

impl std::str::FromStr for DumpRange {
    type Err = WwsrError;

    fn from_str(s: &str) -> Result<Self> {
        DumpRange::parse(s)
    }
}

/// Parse a decimal or `0x`-prefixed hex 16-bit number.
fn parse_number(s: &str) -> Option<u16> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// Render `data` as `0xAAAA: 0xBB 0xBB ...` lines, `width` bytes per line.
///
/// `address` labels the first byte; labels wrap at 0xFFFF.
pub fn hex_dump(address: u16, data: &[u8], width: usize) -> Vec<String> {
    let width = width.max(1);
    data.chunks(width)
        .enumerate()
        .map(|(line, chunk)| {
            let offset = (line * width) as u16;
            let mut s = format!("0x{:04X}:", address.wrapping_add(offset));
            for b in chunk {
                let _ = write!(s, " 0x{b:02X}");
            }
            s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_hex() {
        assert_eq!(
            DumpRange::parse("0x100:0x20").unwrap(),
            DumpRange {
                address: 0x100,
                size: 0x20
            }
        );
    }

    #[test]
    fn test_parse_mixed_forms() {
        assert_eq!(
            DumpRange::parse("0x1E:2").unwrap(),
            DumpRange {
                address: 0x1E,
                size: 2
            }
        );
        assert_eq!(
            DumpRange::parse("30:0x10").unwrap(),
            DumpRange {
                address: 30,
                size: 0x10
            }
        );
        assert_eq!(
            DumpRange::parse("256:64").unwrap(),
            DumpRange {
                address: 256,
                size: 64
            }
        );
    }

    #[test]
    fn test_parse_size_only() {
        assert_eq!(
            DumpRange::parse(":0x40").unwrap(),
            DumpRange {
                address: 0,
                size: 0x40
            }
        );
        assert_eq!(DumpRange::parse(":16").unwrap().size, 16);
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(DumpRange::parse("").unwrap(), DumpRange::default());
        assert_eq!(
            DumpRange::parse("0x200").unwrap(),
            DumpRange {
                address: 0x200,
                size: 0x100
            }
        );
        assert_eq!(DumpRange::parse("0x200:").unwrap().size, 0x100);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(DumpRange::parse("abc:10").is_err());
        assert!(DumpRange::parse("10:0xZZ").is_err());
        assert!(DumpRange::parse("70000:1").is_err()); // exceeds 16 bits
    }

    #[test]
    fn test_hex_dump_lines() {
        let data: Vec<u8> = (0u8..20).collect();
        let lines = hex_dump(0x0100, &data, 16);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0x0100: 0x00 0x01 0x02"));
        assert!(lines[0].ends_with("0x0F"));
        assert_eq!(lines[1], "0x0110: 0x10 0x11 0x12 0x13");
    }

    #[test]
    fn test_hex_dump_empty() {
        assert!(hex_dump(0, &[], 16).is_empty());
    }

    #[test]
    fn test_hex_dump_address_wraps() {
        let lines = hex_dump(0xFFF8, &[0xAA; 16], 8);
        assert_eq!(lines[1], "0x0000: 0xAA 0xAA 0xAA 0xAA 0xAA 0xAA 0xAA 0xAA");
    }
}

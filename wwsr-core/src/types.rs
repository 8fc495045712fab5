//! Shared types, error enum, and hex helpers for wwsr-core.

use std::fmt;

use thiserror::Error;

/// All errors produced by wwsr-core.
#[derive(Debug, Error)]
pub enum WwsrError {
    #[error("device {0} not found")]
    DeviceNotFound(DeviceId),
    #[error("USB error: {0}")]
    Usb(String),
    #[error("invalid device id: {0} (expected VVVV:PPPP in hex)")]
    InvalidDeviceId(String),
    #[error("invalid dump range: {0}")]
    InvalidDumpRange(String),
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid record length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("memory image too short: need at least {needed} bytes, got {actual}")]
    ImageTooShort { needed: usize, actual: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, WwsrError>;

// ---------------------------------------------------------------------------
// USB device id
// ---------------------------------------------------------------------------

pub const DEFAULT_VENDOR: u16 = 0x1941;
pub const DEFAULT_PRODUCT: u16 = 0x8021;

/// USB vendor/product pair identifying the station receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    pub vendor: u16,
    pub product: u16,
}

impl DeviceId {
    pub const fn new(vendor: u16, product: u16) -> Self {
        DeviceId { vendor, product }
    }

    /// Parse `VVVV:PPPP` where both halves are hex (an optional `0x` prefix
    /// is accepted).
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || WwsrError::InvalidDeviceId(text.to_string());

        let (vendor, product) = text.trim().split_once(':').ok_or_else(invalid)?;
        let vendor = parse_hex_u16(vendor).ok_or_else(invalid)?;
        let product = parse_hex_u16(product).ok_or_else(invalid)?;

        Ok(DeviceId { vendor, product })
    }
}

impl Default for DeviceId {
    fn default() -> Self {
        DeviceId::new(DEFAULT_VENDOR, DEFAULT_PRODUCT)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}:{:04X}", self.vendor, self.product)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = WwsrError;

    fn from_str(s: &str) -> Result<Self> {
        DeviceId::parse(s)
    }
}

fn parse_hex_u16(s: &str) -> Option<u16> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if s.is_empty() || s.len() > 4 {
        return None;
    }
    u16::from_str_radix(s, 16).ok()
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, must be even length.
/// Spaces between bytes are ignored.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if !hex.len().is_multiple_of(2) {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.chunks(2) {
        let high = hex_digit(chunk[0])?;
        let low = hex_digit(chunk[1])?;
        bytes.push((high << 4) | low);
    }
    Some(bytes)
}

/// Encode bytes as uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

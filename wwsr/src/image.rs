//! Offline station memory images.
//!
//! Input formats:
//! - Raw binary: byte N of the file is station address N
//! - Text dump: lines as printed by `wwsr dump` (`0x0000: 0x01 0x02 ...`),
//!   placed at the addresses they are labelled with
//!
//! Bytes past 0xFFFF wrap to address 0, as station reads do.

use std::fs;
use std::path::Path;

use wwsr_core::station::MemoryImage;
use wwsr_core::Result;

/// Load a memory image from a raw or text dump file.
pub fn load_image(path: &Path) -> Result<MemoryImage> {
    let content = fs::read(path)?;
    let parsed = std::str::from_utf8(&content).ok().and_then(parse_text_dump);
    MemoryImage::new(parsed.unwrap_or(content))
}

/// Save bytes read from `address` as a raw image that [`load_image`] reads
/// back at the same addresses. Everything below `address` is zero-filled.
pub fn save_image(path: &Path, address: u16, data: &[u8]) -> Result<()> {
    let mut image = Vec::new();
    place_bytes(&mut image, address, data);
    fs::write(path, image)?;
    Ok(())
}

/// Copy `bytes` into `image` starting at `address`, growing it as needed.
fn place_bytes(image: &mut Vec<u8>, address: u16, bytes: &[u8]) {
    for (offset, &byte) in bytes.iter().enumerate() {
        let at = address.wrapping_add(offset as u16) as usize;
        if image.len() <= at {
            image.resize(at + 1, 0);
        }
        image[at] = byte;
    }
}

/// Assemble a text dump into a flat image. Returns `None` unless every
/// non-blank line is a dump line.
fn parse_text_dump(text: &str) -> Option<Vec<u8>> {
    let mut data = Vec::new();
    let mut seen_line = false;

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (address, bytes) = parse_dump_line(line)?;
        seen_line = true;
        place_bytes(&mut data, address, &bytes);
    }

    seen_line.then_some(data)
}

/// Parse one `0xAAAA: 0xBB 0xBB ...` line.
pub fn parse_dump_line(line: &str) -> Option<(u16, Vec<u8>)> {
    let (label, rest) = line.trim().split_once(':')?;
    let address = u16::from_str_radix(label.strip_prefix("0x")?, 16).ok()?;

    let bytes = rest
        .split_whitespace()
        .map(|tok| {
            let hex = tok.strip_prefix("0x")?;
            if hex.len() != 2 {
                return None;
            }
            u8::from_str_radix(hex, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;

    Some((address, bytes))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use wwsr_core::dump::hex_dump;
    use wwsr_core::station::MEMORY_SIZE;
    use wwsr_core::{read_current_record, read_memory};

    fn sample_memory() -> Vec<u8> {
        let mut data = vec![0u8; 0x120];
        data[0x1E] = 0x00;
        data[0x1F] = 0x01; // current record at 0x0100
        data[0x100..0x110].copy_from_slice(&[
            0x00, 0x2D, 0xE1, 0x00, 0x57, 0x32, 0x80, 0x99, 0x27, 0x32, 0x64, 0x00, 0x0F, 0x0A,
            0x00, 0x00,
        ]);
        data
    }

    #[test]
    fn test_parse_dump_line() {
        assert_eq!(
            parse_dump_line("0x0110: 0x10 0x11 0xFF"),
            Some((0x0110, vec![0x10, 0x11, 0xFF]))
        );
        assert_eq!(parse_dump_line("0x0000:"), Some((0, vec![])));
    }

    #[test]
    fn test_parse_dump_line_invalid() {
        assert!(parse_dump_line("hello").is_none());
        assert!(parse_dump_line("0x0000: 0x1").is_none()); // one digit
        assert!(parse_dump_line("0000: 0x10").is_none()); // no prefix
        assert!(parse_dump_line("0x0000: 10").is_none());
    }

    #[test]
    fn test_load_raw_image() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&sample_memory()).unwrap();

        let mut image = load_image(file.path()).unwrap();
        assert_eq!(image.len(), 0x120);
        let record = read_current_record(&mut image).unwrap();
        assert_eq!(record.indoor_humidity(), 45);
        assert_eq!(record.wind_direction_name(), "NNW");
    }

    #[test]
    fn test_load_text_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in hex_dump(0, &sample_memory(), 16) {
            writeln!(file, "{line}").unwrap();
        }

        let mut image = load_image(file.path()).unwrap();
        let record = read_current_record(&mut image).unwrap();
        assert_eq!(record.outdoor_temperature(), -5.0);
        assert!((record.pressure() - 1013.7).abs() < 1e-9);
    }

    #[test]
    fn test_saved_partial_dump_reloads_at_its_addresses() {
        let mut station = MemoryImage::new(sample_memory()).unwrap();
        let data = read_memory(&mut station, 0x10, 0x100).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        save_image(file.path(), 0x10, &data).unwrap();

        let mut image = load_image(file.path()).unwrap();
        assert_eq!(image.len(), 0x110);
        let record = read_current_record(&mut image).unwrap();
        assert_eq!(record.indoor_humidity(), 45);
        assert_eq!(record.outdoor_temperature(), -5.0);
    }

    #[test]
    fn test_saved_dump_wraps_past_end_of_memory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        save_image(file.path(), 0xFFFE, &[0x11, 0x22, 0x33, 0x44]).unwrap();

        let saved = fs::read(file.path()).unwrap();
        assert_eq!(saved.len(), MEMORY_SIZE);
        assert_eq!(&saved[..2], &[0x33, 0x44]);
        assert_eq!(&saved[0xFFFE..], &[0x11, 0x22]);
    }

    #[test]
    fn test_text_dump_line_wraps_past_end_of_memory() {
        let bytes: Vec<u8> = (0xA0..0xB0).collect();
        let text = hex_dump(0xFFF8, &bytes, 16).join("\n");
        assert!(text.starts_with("0xFFF8: 0xA0"));

        let data = parse_text_dump(&text).unwrap();
        assert_eq!(data.len(), MEMORY_SIZE);
        assert_eq!(&data[0xFFF8..], &bytes[..8]);
        assert_eq!(&data[..8], &bytes[8..]);
    }

    #[test]
    fn test_load_too_short() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 4]).unwrap();
        assert!(load_image(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_image(Path::new("/nonexistent/wwsr/image.bin")).is_err());
    }
}

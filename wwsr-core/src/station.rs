//! Station memory read protocol.
//!
//! The receiver exposes its 64 KiB memory through a HID-class interface:
//! 1. An 8-byte read command is sent as a SET_REPORT control transfer.
//! 2. 32 bytes starting at the commanded address come back on the
//!    interrupt IN endpoint.
//!
//! The address of the most recent sensor record lives at [`CURRENT_POINTER_ADDR`].
//! Transport is abstracted behind [`StationIo`] so the protocol can run
//! against real hardware or a [`MemoryImage`].

use std::time::Duration;

use crate::record::{SensorRecord, RECORD_SIZE};
use crate::types::{Result, WwsrError};

/// Bytes returned per read command.
pub const CHUNK_SIZE: usize = 0x20;

/// Address of the little-endian pointer to the current record.
pub const CURRENT_POINTER_ADDR: u16 = 0x1E;

/// Full size of station memory.
pub const MEMORY_SIZE: usize = 0x10000;

// USB control transfer parameters
pub const CONTROL_REQUEST_TYPE: u8 = 0x21; // class | interface, host-to-device
pub const CONTROL_REQUEST: u8 = 0x09; // SET_REPORT
pub const CONTROL_VALUE: u16 = 0x0200;
pub const CONTROL_INDEX: u16 = 0;
pub const INTERRUPT_ENDPOINT: u8 = 0x81;
pub const INTERFACE: u8 = 0;
pub const TIMEOUT: Duration = Duration::from_millis(1000);

const READ_OPCODE: u8 = 0xA1;

/// Command sequence that clears the station's history memory.
pub const RESET_SEQUENCE: [[u8; 8]; 5] = [
    [0xA0, 0x00, 0x00, 0x20, 0xA0, 0x00, 0x00, 0x20],
    [0x55, 0x55, 0xAA, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
    [0x05, 0x20, 0x01, 0x38, 0x11, 0x00, 0x00, 0x00],
    [0x00, 0x00, 0xAA, 0x00, 0x00, 0x00, 0x20, 0x3E],
];

/// Pause after each reset command except the first.
pub const RESET_PAUSE: Duration = Duration::from_millis(28);

/// Low-level transport to the station.
pub trait StationIo {
    /// Send one 8-byte command.
    fn send_command(&mut self, cmd: &[u8; 8]) -> Result<()>;

    /// Receive one block. Returns the number of bytes actually received;
    /// bytes past that count are left zeroed.
    fn read_block(&mut self, buf: &mut [u8; CHUNK_SIZE]) -> Result<usize>;
}

/// Build the read command for `address`.
pub fn read_command(address: u16) -> [u8; 8] {
    let [hi, lo] = address.to_be_bytes();
    let len = CHUNK_SIZE as u8;
    [READ_OPCODE, hi, lo, len, READ_OPCODE, hi, lo, len]
}

/// Decode a read command back into its address. `None` for other commands.
pub fn parse_read_command(cmd: &[u8; 8]) -> Option<u16> {
    if cmd[0] != READ_OPCODE || cmd[4] != READ_OPCODE || cmd[1..4] != cmd[5..8] {
        return None;
    }
    Some(u16::from_be_bytes([cmd[1], cmd[2]]))
}

/// Read `len` bytes starting at `address`, one chunk at a time.
///
/// Addresses wrap at 0xFFFF.
pub fn read_memory<I: StationIo + ?Sized>(io: &mut I, address: u16, len: usize) -> Result<Vec<u8>> {
    let mut data = vec![0u8; len];
    let mut offset = 0usize;

    while offset < len {
        let n = CHUNK_SIZE.min(len - offset);
        let chunk_addr = address.wrapping_add(offset as u16);

        io.send_command(&read_command(chunk_addr))?;
        let mut block = [0u8; CHUNK_SIZE];
        io.read_block(&mut block)?;
        data[offset..offset + n].copy_from_slice(&block[..n]);

        offset += n;
    }

    Ok(data)
}

/// Address of the most recent sensor record.
pub fn current_record_address<I: StationIo + ?Sized>(io: &mut I) -> Result<u16> {
    let ptr = read_memory(io, CURRENT_POINTER_ADDR, 2)?;
    Ok(u16::from_le_bytes([ptr[0], ptr[1]]))
}

/// Follow the current-record pointer and read the record it names.
pub fn read_current_record<I: StationIo + ?Sized>(io: &mut I) -> Result<SensorRecord> {
    let address = current_record_address(io)?;
    let data = read_memory(io, address, RECORD_SIZE)?;
    SensorRecord::from_slice(&data)
}

/// Clear the station's stored history.
pub fn reset_history<I: StationIo + ?Sized>(io: &mut I) -> Result<()> {
    for (i, cmd) in RESET_SEQUENCE.iter().enumerate() {
        io.send_command(cmd)?;
        if i > 0 {
            std::thread::sleep(RESET_PAUSE);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory station
// ---------------------------------------------------------------------------

/// A station backed by a memory image, e.g. a saved full dump.
///
/// Images shorter than 64 KiB read as zero past their end.
#[derive(Debug, Clone)]
pub struct MemoryImage {
    data: Vec<u8>,
    cursor: Option<u16>,
    commands: Vec<[u8; 8]>,
}

impl MemoryImage {
    /// Wrap an image. It must at least cover the current-record pointer.
    pub fn new(mut data: Vec<u8>) -> Result<Self> {
        let needed = CURRENT_POINTER_ADDR as usize + 2;
        if data.len() < needed {
            return Err(WwsrError::ImageTooShort {
                needed,
                actual: data.len(),
            });
        }
        data.truncate(MEMORY_SIZE);
        Ok(MemoryImage {
            data,
            cursor: None,
            commands: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Every command received so far, in order.
    pub fn commands(&self) -> &[[u8; 8]] {
        &self.commands
    }

    fn byte_at(&self, address: u16) -> u8 {
        self.data.get(address as usize).copied().unwrap_or(0)
    }
}

impl StationIo for MemoryImage {
    fn send_command(&mut self, cmd: &[u8; 8]) -> Result<()> {
        self.commands.push(*cmd);
        self.cursor = parse_read_command(cmd);
        Ok(())
    }

    fn read_block(&mut self, buf: &mut [u8; CHUNK_SIZE]) -> Result<usize> {
        let address = self.cursor.take().ok_or_else(|| {
            WwsrError::Usb("interrupt read without a preceding read command".into())
        })?;
        for (i, b) in buf.iter_mut().enumerate() {
            *b = self.byte_at(address.wrapping_add(i as u16));
        }
        Ok(CHUNK_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

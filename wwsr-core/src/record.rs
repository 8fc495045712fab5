//! The station's 16-byte "current" sensor record.
//!
//! Layout (little-endian multi-byte fields):
//!
//! | Offset    | Field                | Encoding                         |
//! |-----------|----------------------|----------------------------------|
//! | 0x01      | indoor humidity      | u8, %                            |
//! | 0x02-0x03 | indoor temperature   | sign bit 15 + 15-bit magnitude, 0.1 °C |
//! | 0x04      | outdoor humidity     | u8, %                            |
//! | 0x05-0x06 | outdoor temperature  | sign bit 15 + 15-bit magnitude, 0.1 °C |
//! | 0x07-0x08 | absolute pressure    | u16, 0.1 hPa                     |
//! | 0x09      | wind speed           | u8, 0.1 m/s                      |
//! | 0x0A      | wind gust            | u8, 0.1 m/s                      |
//! | 0x0C      | wind direction       | u8 index into 16-point compass   |
//! | 0x0D-0x0E | rain total           | u16, 0.3 mm                      |

use crate::compass;
use crate::meteo;
use crate::types::{hex_decode, Result, WwsrError};

pub const RECORD_SIZE: usize = 0x10;

const OFF_INDOOR_HUMIDITY: usize = 0x01;
const OFF_INDOOR_TEMP: usize = 0x02;
const OFF_OUTDOOR_HUMIDITY: usize = 0x04;
const OFF_OUTDOOR_TEMP: usize = 0x05;
const OFF_PRESSURE: usize = 0x07;
const OFF_WIND_SPEED: usize = 0x09;
const OFF_WIND_GUST: usize = 0x0A;
const OFF_WIND_DIR: usize = 0x0C;
const OFF_RAIN: usize = 0x0D;

const RAIN_MM_PER_COUNT: f64 = 0.3;

/// One raw sensor record as read from station memory.
///
/// Every accessor is a pure function of the bytes; nothing is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorRecord {
    bytes: [u8; RECORD_SIZE],
}

impl SensorRecord {
    pub fn new(bytes: [u8; RECORD_SIZE]) -> Self {
        SensorRecord { bytes }
    }

    /// Build from a slice that must be exactly [`RECORD_SIZE`] bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; RECORD_SIZE] =
            data.try_into().map_err(|_| WwsrError::InvalidLength {
                expected: RECORD_SIZE,
                actual: data.len(),
            })?;
        Ok(SensorRecord { bytes })
    }

    /// Parse a 32-digit hex string (spaces allowed).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let data = hex_decode(hex).ok_or_else(|| WwsrError::InvalidHex(hex.to_string()))?;
        Self::from_slice(&data)
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_SIZE] {
        &self.bytes
    }

    fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    /// Decode a sign-magnitude temperature field (not two's complement).
    fn temperature_at(&self, offset: usize) -> f64 {
        let raw = self.u16_at(offset);
        let magnitude = (raw & 0x7FFF) as f64 / 10.0;
        if raw & 0x8000 != 0 {
            -magnitude
        } else {
            magnitude
        }
    }

    // -- Direct measurements ------------------------------------------------

    pub fn indoor_humidity(&self) -> u8 {
        self.bytes[OFF_INDOOR_HUMIDITY]
    }

    pub fn outdoor_humidity(&self) -> u8 {
        self.bytes[OFF_OUTDOOR_HUMIDITY]
    }

    /// Indoor temperature in °C.
    pub fn indoor_temperature(&self) -> f64 {
        self.temperature_at(OFF_INDOOR_TEMP)
    }

    /// Outdoor temperature in °C.
    pub fn outdoor_temperature(&self) -> f64 {
        self.temperature_at(OFF_OUTDOOR_TEMP)
    }

    /// Average wind speed in m/s.
    pub fn wind_speed(&self) -> f64 {
        self.bytes[OFF_WIND_SPEED] as f64 / 10.0
    }

    /// Wind gust in m/s.
    pub fn wind_gust(&self) -> f64 {
        self.bytes[OFF_WIND_GUST] as f64 / 10.0
    }

    /// Raw compass index as stored by the station (may exceed 15).
    pub fn wind_direction_index(&self) -> u8 {
        self.bytes[OFF_WIND_DIR]
    }

    pub fn wind_direction_name(&self) -> &'static str {
        compass::point_name(self.wind_direction_index())
    }

    pub fn wind_direction_degrees(&self) -> &'static str {
        compass::point_degrees(self.wind_direction_index())
    }

    /// Absolute pressure in hPa.
    pub fn pressure(&self) -> f64 {
        self.u16_at(OFF_PRESSURE) as f64 / 10.0
    }

    /// Cumulative rain in mm.
    pub fn rain(&self) -> f64 {
        self.u16_at(OFF_RAIN) as f64 * RAIN_MM_PER_COUNT
    }

    // -- Derived quantities -------------------------------------------------

    /// Outdoor dew point in °C.
    pub fn dew_point(&self) -> f64 {
        meteo::dew_point(self.outdoor_temperature(), self.outdoor_humidity())
    }

    /// Outdoor wind chill in °C.
    pub fn wind_chill(&self) -> f64 {
        meteo::wind_chill(
            self.outdoor_temperature(),
            meteo::ms_to_kmh(self.wind_speed()),
        )
    }

    /// Pressure reduced to sea level for a station at `altitude_m`.
    pub fn relative_pressure(&self, altitude_m: i32) -> f64 {
        meteo::relative_pressure(self.pressure(), self.outdoor_temperature(), altitude_m)
    }
}

impl From<[u8; RECORD_SIZE]> for SensorRecord {
    fn from(bytes: [u8; RECORD_SIZE]) -> Self {
        SensorRecord::new(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! A fully evaluated snapshot of one sensor record.

use serde::Serialize;

use crate::record::SensorRecord;

/// Every measurement of a [`SensorRecord`] at a given station altitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub indoor_humidity: u8,
    pub outdoor_humidity: u8,
    pub indoor_temperature: f64,
    pub outdoor_temperature: f64,
    pub dew_point: f64,
    pub wind_chill: f64,
    pub wind_speed: f64,
    pub wind_gust: f64,
    pub wind_direction: &'static str,
    pub wind_direction_degrees: &'static str,
    pub pressure: f64,
    pub relative_pressure: f64,
    pub rain: f64,
    pub altitude: i32,
}

impl Reading {
    pub fn from_record(record: &SensorRecord, altitude: i32) -> Self {
        Reading {
            indoor_humidity: record.indoor_humidity(),
            outdoor_humidity: record.outdoor_humidity(),
            indoor_temperature: record.indoor_temperature(),
            outdoor_temperature: record.outdoor_temperature(),
            dew_point: record.dew_point(),
            wind_chill: record.wind_chill(),
            wind_speed: record.wind_speed(),
            wind_gust: record.wind_gust(),
            wind_direction: record.wind_direction_name(),
            wind_direction_degrees: record.wind_direction_degrees(),
            pressure: record.pressure(),
            relative_pressure: record.relative_pressure(altitude),
            rain: record.rain(),
            altitude,
        }
    }
}

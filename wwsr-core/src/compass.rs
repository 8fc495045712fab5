//! 16-point compass rose used for the station's wind direction index.

/// Compass point names, clockwise from north.
pub const POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Bearing of each compass point in whole degrees, as displayed by the station.
pub const DEGREES: [&str; 16] = [
    "0", "23", "45", "68", "90", "113", "135", "158", "180", "203", "225", "248", "270", "293",
    "315", "338",
];

/// Clamp a raw direction index into the table. Out-of-range values map to north.
pub fn clamp_index(index: u8) -> usize {
    let i = index as usize;
    if i < POINTS.len() {
        i
    } else {
        0
    }
}

/// Compass point name for a raw direction index.
pub fn point_name(index: u8) -> &'static str {
    POINTS[clamp_index(index)]
}

/// Compass bearing string for a raw direction index.
pub fn point_degrees(index: u8) -> &'static str {
    DEGREES[clamp_index(index)]
}

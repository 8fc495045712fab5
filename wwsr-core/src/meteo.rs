//! Derived meteorological quantities.
//!
//! - Dew point: Magnus-form approximation (a = 17.271, b = 237.7 °C)
//! - Wind chill: North American / UK wind chill index, km/h input
//! - Relative pressure: barometric reduction to sea level using outdoor
//!   temperature

// Magnus coefficients
const MAGNUS_A: f64 = 17.271;
const MAGNUS_B: f64 = 237.7;

/// Humidity fraction used in place of 0% to keep ln() finite.
pub const MIN_HUMIDITY_FRACTION: f64 = 0.001;

/// Wind chill only applies above this speed (km/h)...
pub const WIND_CHILL_MIN_SPEED_KMH: f64 = 4.8;
/// ...and below this temperature (°C).
pub const WIND_CHILL_MAX_TEMP_C: f64 = 10.0;

/// Convert m/s to km/h.
pub fn ms_to_kmh(speed_ms: f64) -> f64 {
    speed_ms * 3.6
}

/// Dew point in °C from temperature (°C) and relative humidity (percent).
pub fn dew_point(temp_c: f64, humidity_pct: u8) -> f64 {
    let mut h = humidity_pct as f64 / 100.0;
    if humidity_pct == 0 {
        h = MIN_HUMIDITY_FRACTION;
    }
    let gamma = (MAGNUS_A * temp_c) / (MAGNUS_B + temp_c) + h.ln();
    (MAGNUS_B * gamma) / (MAGNUS_A - gamma)
}

/// Wind chill temperature in °C.
///
/// Returns `temp_c` unchanged outside the index's validity range.
pub fn wind_chill(temp_c: f64, speed_kmh: f64) -> f64 {
    if speed_kmh > WIND_CHILL_MIN_SPEED_KMH && temp_c < WIND_CHILL_MAX_TEMP_C {
        let v = speed_kmh.powf(0.16);
        13.12 + 0.6215 * temp_c - 11.37 * v + 0.3965 * temp_c * v
    } else {
        temp_c
    }
}

/// Exponent of the sea-level correction `10^m`.
///
/// Returns `None` when the denominator is zero, negative or not finite, which
/// only happens for outdoor temperatures far below anything physical.
pub fn pressure_exponent(temp_c: f64, altitude_m: i32) -> Option<f64> {
    let altitude = altitude_m as f64;
    let denominator = 18429.1 + 67.53 * temp_c + 0.003 * altitude;
    if !denominator.is_finite() || denominator <= 0.0 {
        return None;
    }
    Some(altitude / denominator)
}

/// Sea-level (relative) pressure in hPa from absolute pressure (hPa),
/// outdoor temperature (°C) and station altitude (m).
///
/// When the correction exponent is undefined the absolute pressure is
/// returned uncorrected.
pub fn relative_pressure(abs_hpa: f64, temp_c: f64, altitude_m: i32) -> f64 {
    match pressure_exponent(temp_c, altitude_m) {
        Some(m) => abs_hpa * 10f64.powf(m),
        None => abs_hpa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dew_point_reference() {
        // 20 °C at 50% RH → ~9.3 °C
        let dp = dew_point(20.0, 50);
        assert!((dp - 9.26).abs() < 0.05, "dew point was {dp}");
    }

    #[test]
    fn test_dew_point_saturated_equals_temperature() {
        let dp = dew_point(15.0, 100);
        assert!((dp - 15.0).abs() < 1e-9, "dew point was {dp}");
    }

    #[test]
    fn test_dew_point_zero_humidity_is_finite() {
        let dp = dew_point(20.0, 0);
        assert!(dp.is_finite());
        assert!(dp < -40.0, "dew point at 0.1% RH should be very low, got {dp}");
    }

    #[test]
    fn test_wind_chill_applies() {
        // 5 °C, 18 km/h
        let wc = wind_chill(5.0, 18.0);
        assert!(wc < 5.0);
        assert!((wc - 1.3).abs() < 0.1, "wind chill was {wc}");
    }

    #[test]
    fn test_wind_chill_warm_unchanged() {
        assert_eq!(wind_chill(15.0, 18.0), 15.0);
        assert_eq!(wind_chill(10.0, 18.0), 10.0); // boundary is exclusive
    }

    #[test]
    fn test_wind_chill_calm_unchanged() {
        assert_eq!(wind_chill(-5.0, 4.8), -5.0);
        assert_eq!(wind_chill(-5.0, 0.0), -5.0);
    }

    #[test]
    fn test_relative_pressure_sea_level() {
        for t in [-30.0, 0.0, 25.0, 45.0] {
            assert_eq!(relative_pressure(1013.2, t, 0), 1013.2);
        }
    }

    #[test]
    fn test_relative_pressure_above_sea_level() {
        // ~300 m at 15 °C adds roughly 35 hPa
        let p = relative_pressure(978.0, 15.0, 300);
        assert!(p > 1010.0 && p < 1016.0, "relative pressure was {p}");
    }

    #[test]
    fn test_relative_pressure_below_sea_level() {
        let p = relative_pressure(1020.0, 20.0, -100);
        assert!(p < 1020.0);
    }

    #[test]
    fn test_pressure_exponent_degenerate_denominator() {
        // 18429.1 + 67.53 * -300 < 0
        assert!(pressure_exponent(-300.0, 100).is_none());
        assert_eq!(relative_pressure(950.0, -300.0, 100), 950.0);
        assert!(pressure_exponent(f64::NAN, 100).is_none());
    }

    #[test]
    fn test_ms_to_kmh() {
        assert!((ms_to_kmh(5.0) - 18.0).abs() < 1e-9);
    }
}

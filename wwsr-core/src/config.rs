//! Configuration file management for wwsr.
//!
//! Reads/writes `~/.wwsr/config.yaml` (or a path given with `--config`)
//! with the station's USB id, its altitude, and an optional default output
//! format.

use std::path::{Path, PathBuf};

use crate::types::{DeviceId, WwsrError};

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub station: StationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub device: DeviceId,
    /// Meters above sea level, used for relative pressure.
    pub altitude: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputConfig {
    /// Template used by `read` when no format is given on the command line.
    pub format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station: StationConfig {
                device: DeviceId::default(),
                altitude: 0,
            },
            output: OutputConfig::default(),
        }
    }
}

/// Get the config directory path (`~/.wwsr/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".wwsr")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `path` (normally [`config_file`]).
///
/// Returns default config if file doesn't exist; an unreadable or malformed
/// file is an error.
pub fn load_config_from(path: &Path) -> Result<Config, WwsrError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Save config to `path`, creating its directory.
pub fn save_config_to(config: &Config, path: &Path) -> Result<(), WwsrError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| WwsrError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config)).map_err(|e| WwsrError::Config(e.to_string()))
}

/// Parse simple YAML-like config text.
pub fn parse_config(text: &str) -> Result<Config, WwsrError> {
    let mut config = Config::default();
    let mut current_section: Option<String> = None;

    for (n, line) in text.lines().enumerate() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            return Err(WwsrError::Config(format!(
                "line {}: expected `key: value`",
                n + 1
            )));
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = if val.is_empty() {
                Some(key.to_string())
            } else {
                None
            };
            continue;
        }

        match (current_section.as_deref(), key) {
            (Some("station"), "device") => {
                if let Some(v) = parse_string_value(val) {
                    config.station.device = DeviceId::parse(&v)?;
                }
            }
            (Some("station"), "altitude") => {
                config.station.altitude = val.parse().map_err(|_| {
                    WwsrError::Config(format!("line {}: invalid altitude `{val}`", n + 1))
                })?;
            }
            (Some("output"), "format") => config.output.format = parse_string_value(val),
            _ => {}
        }
    }

    Ok(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

/// Serialize config to YAML-like text.
///
/// Formats are stored with their escapes (`\n`, `\t`) unexpanded, so they
/// must stay on one line.
pub fn serialize_config(config: &Config) -> String {
    let mut lines = vec!["# wwsr configuration".to_string(), String::new()];

    lines.push("station:".into());
    lines.push(format!("  device: \"{}\"", config.station.device));
    lines.push(format!("  altitude: {}", config.station.altitude));
    lines.push(String::new());

    lines.push("output:".into());
    match &config.output.format {
        Some(f) => lines.push(format!("  format: \"{f}\"")),
        None => lines.push("  format: null".into()),
    }

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.station.device, DeviceId::new(0x1941, 0x8021));
        assert_eq!(config.station.altitude, 0);
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
# my station
station:
  device: "0fde:ca01"
  altitude: 312

output:
  format: "%T C, %H %%\n"
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.station.device, DeviceId::new(0x0FDE, 0xCA01));
        assert_eq!(config.station.altitude, 312);
        assert_eq!(config.output.format.as_deref(), Some(r"%T C, %H %%\n"));
    }

    #[test]
    fn test_parse_config_null_values() {
        let text = "station:\n  altitude: -20\noutput:\n  format: ~\n";
        let config = parse_config(text).unwrap();
        assert_eq!(config.station.altitude, -20);
        assert_eq!(config.station.device, DeviceId::default());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_parse_config_invalid_altitude() {
        let err = parse_config("station:\n  altitude: high\n").unwrap_err();
        assert!(err.to_string().contains("invalid altitude"));
    }

    #[test]
    fn test_parse_config_invalid_device() {
        assert!(matches!(
            parse_config("station:\n  device: nope\n"),
            Err(WwsrError::InvalidDeviceId(_))
        ));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse_config("station:\n  colour: blue\nextra: 1\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_roundtrip() {
        let config = Config {
            station: StationConfig {
                device: DeviceId::new(0x1941, 0x8021),
                altitude: 1450,
            },
            output: OutputConfig {
                format: Some(r"%N %T\n".into()),
            },
        };
        let text = serialize_config(&config);
        assert_eq!(parse_config(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join("wwsr-no-such-dir/config.yaml");
        assert_eq!(load_config_from(&path).unwrap(), Config::default());
    }
}

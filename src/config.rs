use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_RESIDUAL_BLOCKS: usize = 6;
pub const DEFAULT_RESIDUAL_FILTERS: usize = 64;

/// Architecture hyperparameters of the residual network.
///
/// The settings are read once at startup and passed around by value, tools
/// never mutate them afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Settings {
    pub residual_blocks: usize,
    pub residual_filters: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            residual_blocks: DEFAULT_RESIDUAL_BLOCKS,
            residual_filters: DEFAULT_RESIDUAL_FILTERS,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Keys missing from the file keep their
    /// default values.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Settings> {
        let text = fs::read_to_string(path)?;
        Settings::from_json(&text)
    }

    pub fn from_json(text: &str) -> io::Result<Settings> {
        let parsed = json::parse(text).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid settings json: {}", e),
            )
        })?;
        if !parsed.is_object() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "settings must be a json object",
            ));
        }

        let defaults = Settings::default();
        let settings = Settings {
            residual_blocks: read_key(&parsed, "residual_blocks", defaults.residual_blocks)?,
            residual_filters: read_key(&parsed, "residual_filters", defaults.residual_filters)?,
        };
        if settings.residual_filters == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "residual_filters must be positive",
            ));
        }
        Ok(settings)
    }
}

fn read_key(parsed: &json::JsonValue, key: &str, default: usize) -> io::Result<usize> {
    let value = &parsed[key];
    if value.is_null() {
        return Ok(default);
    }
    value.as_usize().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("settings key {:?} is not a non-negative integer", key),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.residual_blocks, 6);
        assert_eq!(settings.residual_filters, 64);
    }

    #[test]
    fn parse_full() {
        let settings = Settings::from_json(r#"{"residual_blocks": 10, "residual_filters": 128}"#)
            .unwrap();
        assert_eq!(settings.residual_blocks, 10);
        assert_eq!(settings.residual_filters, 128);
    }

    #[test]
    fn parse_partial_keeps_defaults() {
        let settings = Settings::from_json(r#"{"residual_blocks": 2}"#).unwrap();
        assert_eq!(settings.residual_blocks, 2);
        assert_eq!(settings.residual_filters, DEFAULT_RESIDUAL_FILTERS);

        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn parse_errors() {
        assert!(Settings::from_json("not json at all").is_err());
        assert!(Settings::from_json(r#"{"residual_blocks": "six"}"#).is_err());
        assert!(Settings::from_json(r#"{"residual_blocks": -3}"#).is_err());
        assert!(Settings::from_json(r#"{"residual_filters": 0}"#).is_err());
    }

    #[test]
    fn parse_rejects_non_objects() {
        /* valid json, but not a settings object: must not fall back to the
         * defaults silently */
        for text in ["42", "[1, 2, 3]", r#""residual_blocks""#, "null", "true"] {
            let err = Settings::from_json(text).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "input {:?}", text);
        }
    }
}

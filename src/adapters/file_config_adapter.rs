//! INI file configuration adapter.
//!
//! Backs [`ConfigPort`] with `configparser`. Section and key names are
//! case-insensitive. Missing or unparsable values fall back to the caller's
//! default; only an unreadable or malformed file is an error.

use crate::domain::error::QuantfolioError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use tracing::debug;

pub struct FileConfigAdapter {
    ini: Ini,
    origin: String,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, QuantfolioError> {
        let origin = path.as_ref().display().to_string();
        let mut ini = Ini::new();
        ini.load(path.as_ref())
            .map_err(|reason| QuantfolioError::ConfigParse {
                file: origin.clone(),
                reason,
            })?;
        debug!(file = %origin, sections = ini.sections().len(), "loaded config");
        Ok(Self { ini, origin })
    }

    pub fn from_string(content: &str) -> Result<Self, QuantfolioError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| QuantfolioError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self {
            ini,
            origin: "<inline>".to_string(),
        })
    }

    /// Where the settings were read from, for error messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini.get(section, key).filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        match self.ini.getint(section, key) {
            Ok(Some(value)) => value,
            _ => default,
        }
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        match self.ini.getfloat(section, key) {
            Ok(Some(value)) if value.is_finite() => value,
            _ => default,
        }
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .as_deref()
            .and_then(parse_flag)
            .unwrap_or(default)
    }
}

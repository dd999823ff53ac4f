//! XML configuration support.
//!
//! Format:
//! <config>
//!   <codepage>windows-1252</codepage>
//!   <log_level>info</log_level>
//!   <log_file>/path/to/cdirectory.log</log_file>
//! </config>
//!
//! Notes:
//! - Every element is optional; absent or empty elements keep the default.
//! - Unknown elements are rejected so misspellings surface instead of being ignored.
//! - A missing config file is not an error: defaults apply.

use anyhow::{Context, Result, anyhow};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::config_path;
use super::types::{Config, LogLevel};
use crate::codepage::Codepage;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "codepage")]
    codepage: Option<String>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config, rejecting values that do not parse.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.codepage.as_deref()) {
        cfg.codepage = s.parse::<Codepage>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    cfg.log_file = non_empty(parsed.log_file.as_deref()).map(PathBuf::from);

    Ok(cfg)
}

/// Load a Config from a specific XML file path (quick_xml).
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the config in use (see [`config_path`]). Returns the path it came
/// from, or `None` alongside defaults when no file exists.
pub fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let Some(path) = config_path() else {
        debug!("no config location available; using defaults");
        return Ok((Config::default(), None));
    };
    if !path.exists() {
        debug!(path = %path.display(), "config file not found; using defaults");
        return Ok((Config::default(), None));
    }
    let cfg = load_config_from_xml_path(&path)?;
    debug!(path = %path.display(), "loaded config");
    Ok((cfg, Some(path)))
}

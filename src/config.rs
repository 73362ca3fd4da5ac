use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::document::PaintProperty;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Old fully-qualified variable name -> replacement variable name.
    /// Falls back to the built-in migration table when absent or empty.
    #[serde(default)]
    pub rename: IndexMap<String, String>,
    /// Paint properties eligible for rewriting.
    #[serde(default = "default_properties")]
    pub properties: Vec<PaintProperty>,
    /// Shared-library directories, searched after any given on the command
    /// line, in order.
    #[serde(default)]
    pub libraries: Vec<String>,
}

fn default_properties() -> Vec<PaintProperty> {
    vec![PaintProperty::Fills]
}

/// The built-in migration table: the legacy token names and their
/// replacements in the consolidated palette.
pub fn default_rename_table() -> IndexMap<String, String> {
    [
        ("OLD NEUTRALS/default/T__primary-default", "Neutral/600"),
        ("OLD NEUTRALS/default/T__primary-hover", "Neutral/700"),
        ("OLD NEUTRALS/default/T__primary-focus", "Neutral/300"),
        ("OLD NEUTRALS/default/T__primary-active", "Neutral/800"),
        ("OLD NEUTRALS/default/T__primary-disabled", "Neutral/50"),
        ("Info/T__default/T__common-info-default", "Info/500"),
        ("Info/T__default/T__common-info-hover", "Info/600"),
        ("Info/T__default/T__common-info-focus", "Info/700"),
        ("Info/T__default/T__common-info-active", "Info/800"),
        ("Info/T__default/T__common-info-disabled", "Info/50"),
        ("warning/T__default/T__common-warning-default", "Warning/600"),
        ("warning/T__default/T__common-warning-hover", "Warning/700"),
        ("warning/T__default/T__common-warning-focus", "Warning/800"),
        ("warning/T__default/T__common-warning-active", "Warning/900"),
        ("warning/T__default/T__common-warning-disabled", "Warning/50"),
        ("error/T__default/T__common-error-default", "Error/700"),
        ("error/T__default/T__common-error-hover", "Error/800"),
        ("error/T__default/T__common-error-focus", "Error/900"),
        ("error/T__default/T__common-error-active", "Error/925"),
        ("error/T__default/T__common-error-disabled", "Error/50"),
        ("success/T__default/T__common-success-default", "Success/600"),
        ("success/T__default/T__common-success-hover", "Success/700"),
        ("success/T__default/T__common-success-focus", "Success/800"),
        ("success/T__default/T__common-success-active", "Success/900"),
        ("success/T__default/T__common-success-disabled", "Success/50"),
        ("T__surface/T__background", "Neutral/00"),
    ]
    .into_iter()
    .map(|(old, new)| (old.to_string(), new.to_string()))
    .collect()
}

/// Matches anything a variable name must not contain: empty slash
/// segments, leading/trailing slashes, control characters, or nothing
/// at all.
pub fn get_invalid_variable_name_re() -> &'static Regex {
    static VARIABLE_NAME_RE: OnceLock<Regex> = OnceLock::new();
    VARIABLE_NAME_RE
        .get_or_init(|| Regex::new(r"(?://)|[\x00-\x1f]|^/|/$|^$").unwrap())
}

pub fn validate_rename_table(rename: &IndexMap<String, String>) -> Result<(), Box<dyn Error>> {
    let invalid_re = get_invalid_variable_name_re();
    for (old_name, new_name) in rename {
        for name in [old_name, new_name] {
            if invalid_re.is_match(name) {
                return Err(format!("invalid variable name in rename table: '{}'", name).into());
            }
        }
    }
    Ok(())
}

pub fn get_config(config_path_override: &Option<String>) -> Result<Config, Box<dyn Error>> {
    let path = match config_path_override {
        Some(path) => PathBuf::from(path),
        None => get_config_path(),
    };
    let mut config: Config = if path.exists() {
        toml::from_str(&fs::read_to_string(&path)?)?
    } else if config_path_override.is_some() {
        return Err(format!("config file not found: {}", path.display()).into());
    } else {
        // No config is fine; everything has a default
        toml::from_str("")?
    };
    if config.rename.is_empty() {
        config.rename = default_rename_table();
    }
    validate_rename_table(&config.rename)?;
    Ok(config)
}

pub fn create_config_dir_if_missing() -> Result<(), Box<dyn Error>> {
    let path = get_config_folder_path();
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn get_config_folder_path() -> PathBuf {
    let mut path = PathBuf::new();
    path.push(dirs::home_dir().unwrap());
    path.push(".rebind");
    path
}

fn get_config_path() -> PathBuf {
    let mut path = get_config_folder_path();
    path.push("rebind.toml");
    path
}

// ---

fn get_debug_log_path() -> PathBuf {
    let mut path = get_config_folder_path();
    path.push("debug.log");
    path
}

pub fn write_to_debug_log(log: String) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(get_debug_log_path())?;
    file.write_all(log.as_bytes())?;
    Ok(())
}

// --

// User settings
// Loaded from ~/.config/gridex/settings.json

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gridex_engine::find::{FindDirection, FindOptions};
use gridex_engine::units::RegistryOptions;
use gridex_engine::MatrixConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("cannot encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Clipboard
    /// Single character; anything else falls back to a tab.
    #[serde(rename = "clipboard.separator")]
    pub separator: String,

    #[serde(rename = "clipboard.keepStructure")]
    pub keep_structure: bool,

    // Undo
    #[serde(rename = "undo.enabled")]
    pub undo_enabled: bool,

    #[serde(rename = "undo.maxEntries")]
    pub undo_max_entries: Option<usize>,  // None = unlimited

    // Find
    #[serde(rename = "find.matchCase")]
    pub match_case: bool,

    #[serde(rename = "find.matchWholeCell")]
    pub match_whole_cell: bool,

    #[serde(rename = "find.direction")]
    pub find_direction: FindDirection,

    // Units
    #[serde(rename = "units.americanSpelling")]
    pub american_spelling: bool,

    #[serde(rename = "units.utf8Symbols")]
    pub utf8_symbols: bool,

    // Busy
    /// Operations touching fewer cells show no progress indicator.
    #[serde(rename = "busy.progressThreshold")]
    pub progress_threshold: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: "\t".to_string(),
            keep_structure: false,
            undo_enabled: true,
            undo_max_entries: None,
            match_case: false,
            match_whole_cell: false,
            find_direction: FindDirection::LeftTop,
            american_spelling: false,
            utf8_symbols: true,
            progress_threshold: 100,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Clipboard: one-character separator, keep unmarked cells as blanks
    "clipboard.separator": "\t",
    "clipboard.keepStructure": false,

    // Undo (null = unlimited history)
    "undo.enabled": true,
    "undo.maxEntries": null,

    // Find
    // Direction options: "lefttop", "topleft", "bottomright", "rightbottom"
    "find.matchCase": false,
    "find.matchWholeCell": false,
    "find.direction": "lefttop",

    // Units
    "units.americanSpelling": false,
    "units.utf8Symbols": true,

    // Progress indicator for long operations
    "busy.progressThreshold": 100
}
"#;

/// Parse settings text. Lines starting with `//` are comments.
pub fn parse(contents: &str) -> Result<Settings, serde_json::Error> {
    let cleaned: String = contents
        .lines()
        .filter(|line| !line.trim().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");
    serde_json::from_str(&cleaned)
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridex");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, creating a commented
    /// default file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            create_default_file(&path);
            return Self::default();
        }
        Self::load_from(&path)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("settings: cannot parse {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("settings: cannot read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }

    /// The configured separator, or a tab when the setting is not a single
    /// character.
    pub fn separator_char(&self) -> char {
        let mut chars = self.separator.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                warn!("settings: separator {:?} is not one character, using tab", self.separator);
                '\t'
            }
        }
    }

    /// Settings as the engine consumes them.
    pub fn matrix_config(&self) -> MatrixConfig {
        MatrixConfig {
            separator: self.separator_char(),
            keep_structure: self.keep_structure,
            undo_enabled: self.undo_enabled,
            undo_max_entries: self.undo_max_entries,
            find: FindOptions {
                direction: self.find_direction,
                match_case: self.match_case,
                match_whole_cell: self.match_whole_cell,
                column: None,
            },
            units: RegistryOptions { american_spelling: self.american_spelling, utf8: self.utf8_symbols },
            progress_threshold: self.progress_threshold,
        }
    }
}

fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("settings: cannot create {}: {}", parent.display(), e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("settings: cannot write default {}: {}", path.display(), e);
    }
}

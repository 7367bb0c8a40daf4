//! # Settings
//!
//! User preferences (interface language and description style) as an
//! explicit value. Persistence goes through a small [`KeyValueStore`] the
//! caller injects. Missing or unreadable values fall back to the defaults
//! (`ru`, `catalog`) without error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ZcatError;
use crate::style::DescriptionStyle;

pub const LANGUAGE_KEY: &str = "zcat-language";
pub const DESCRIPTION_STYLE_KEY: &str = "zcat_description_style";

/// Interface and generation language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    /// Parse a stored language code. Only exact known codes are accepted.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            _ => None,
        }
    }
}

impl From<String> for Language {
    fn from(code: String) -> Self {
        Language::from_code(&code).unwrap_or_default()
    }
}

/// A string key-value store, e.g. browser local storage or a settings file.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ZcatError>;
}

/// In-memory store, used by tests and by callers without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ZcatError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A store backed by a flat JSON object file.
///
/// A missing or corrupt file reads as empty. Writes rewrite the whole file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt settings file {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ZcatError> {
        self.values.insert(key.to_string(), value.to_string());
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// The caller's preferences for one editing session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub language: Language,
    pub description_style: DescriptionStyle,
}

impl Settings {
    /// Read settings from a store, falling back to defaults per key.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let language = store
            .get(LANGUAGE_KEY)
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default();
        let description_style = store
            .get(DESCRIPTION_STYLE_KEY)
            .and_then(|id| DescriptionStyle::from_id(&id))
            .unwrap_or_default();
        Self {
            language,
            description_style,
        }
    }

    /// Persist both keys. A failing store is logged, never fatal.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        if let Err(e) = store.set(LANGUAGE_KEY, self.language.code()) {
            log::warn!("Failed to persist language: {}", e);
        }
        if let Err(e) = store.set(DESCRIPTION_STYLE_KEY, self.description_style.id()) {
            log::warn!("Failed to persist description style: {}", e);
        }
    }
}

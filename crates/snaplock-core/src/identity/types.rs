use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::AppsConfig;
use crate::geometry::Rect;

/// Logical identity of a window: `(process_name, match_key)`.
///
/// `match_key` is `domain:<host>`, `title:<cleaned title>`, or empty for
/// records written before match keys existed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub process_name: String,
    pub match_key: String,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.match_key.is_empty() {
            write!(f, "{}", self.process_name)
        } else {
            write!(f, "{} [{}]", self.process_name, self.match_key)
        }
    }
}

/// A captured window identity with a target rect and relaunch metadata.
///
/// Locks and scene items share this shape. Optional fields are empty strings
/// when unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub process_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub match_key: String,
    pub rect: Rect,
    #[serde(default)]
    pub exec_path: String,
    /// Browser URL or folder path.
    #[serde(default)]
    pub url: String,
}

/// A window pinned to a fixed rect.
pub type LockEntry = WindowRecord;

/// One window of a saved scene.
pub type SceneItem = WindowRecord;

impl WindowRecord {
    pub fn new(process_name: impl Into<String>, title: impl Into<String>, rect: Rect) -> Self {
        Self {
            process_name: process_name.into(),
            title: title.into(),
            match_key: String::new(),
            rect,
            exec_path: String::new(),
            url: String::new(),
        }
    }

    pub fn with_match_key(mut self, match_key: impl Into<String>) -> Self {
        self.match_key = match_key.into();
        self
    }

    pub fn with_exec_path(mut self, exec_path: impl Into<String>) -> Self {
        self.exec_path = exec_path.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            process_name: self.process_name.clone(),
            match_key: self.match_key.clone(),
        }
    }
}

/// Process names that get special identity treatment, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppClasses {
    browsers: Vec<String>,
    folder_browsers: Vec<String>,
}

impl Default for AppClasses {
    fn default() -> Self {
        Self::from_config(&AppsConfig::default())
    }
}

impl AppClasses {
    pub fn new<I, J, S, T>(browsers: I, folder_browsers: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            browsers: browsers.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
            folder_browsers: folder_browsers
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &AppsConfig) -> Self {
        Self::new(config.browsers(), config.folder_browsers())
    }

    /// Multi-document app identified by domain or title.
    pub fn is_browser(&self, process_name: &str) -> bool {
        let name = process_name.to_lowercase();
        self.browsers.iter().any(|b| *b == name)
    }

    pub fn is_folder_browser(&self, process_name: &str) -> bool {
        let name = process_name.to_lowercase();
        self.folder_browsers.iter().any(|b| *b == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_app_classes() {
        let classes = AppClasses::default();
        assert!(classes.is_browser("msedge"));
        assert!(classes.is_browser("Chrome"));
        assert!(classes.is_folder_browser("Explorer"));
        assert!(!classes.is_browser("explorer"));
        assert!(!classes.is_folder_browser("code"));
    }

    #[test]
    fn test_record_json_fills_missing_optionals() {
        let json = r#"{"process_name":"code","rect":{"x":0,"y":0,"width":10,"height":10}}"#;
        let record: WindowRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, WindowRecord::new("code", "", Rect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_fingerprint_display() {
        let record = WindowRecord::new("chrome", "Docs", Rect::default())
            .with_match_key("domain:docs.rs");
        assert_eq!(record.fingerprint().to_string(), "chrome [domain:docs.rs]");
        let legacy = WindowRecord::new("code", "x", Rect::default());
        assert_eq!(legacy.fingerprint().to_string(), "code");
    }
}

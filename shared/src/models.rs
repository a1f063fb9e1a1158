//! Data models for the Hackathon Platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Telegram user as embedded (JSON-encoded) in the `user` field of Mini App
/// init-data.
///
/// Unknown keys (`allows_write_to_pm`, `added_to_attachment_menu`, ...) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl WebAppUser {
    /// Display name built from first and last name.
    ///
    /// Falls back to `User_<id>` when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name,
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        if full.is_empty() {
            format!("User_{}", self.id)
        } else {
            full.to_string()
        }
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        f.write_str(s)
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err("Invalid theme. Must be one of: light, dark, system".to_string()),
        }
    }
}

use super::preset::{preset_or_default, ColorPreset};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT: &str = "Guess";

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A saved creation. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creation {
    pub id: uuid::Uuid,
    pub text: String,
    pub preset: String,
    pub created_at: i64,
    pub created_by: String,
}

impl Creation {
    pub fn new(text: String, preset: String, created_by: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            text,
            preset,
            created_at: now_millis(),
            created_by,
        }
    }

    pub fn color_preset(&self) -> &'static ColorPreset {
        preset_or_default(Some(&self.preset))
    }

    /// Link that reopens the editor with this creation's text and preset.
    pub fn remix_path(&self) -> String {
        EditState::new(self.text.clone(), Some(&self.preset)).share_path()
    }
}

/// Text and preset currently being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub text: String,
    pub preset: &'static ColorPreset,
}

impl EditState {
    pub fn new(text: String, preset: Option<&str>) -> Self {
        Self {
            text,
            preset: preset_or_default(preset),
        }
    }

    pub fn from_query(text: Option<String>, preset: Option<&str>) -> Self {
        Self::new(text.unwrap_or_else(|| DEFAULT_TEXT.to_string()), preset)
    }

    pub fn share_path(&self) -> String {
        format!(
            "/?text={}&preset={}",
            urlencoding::encode(&self.text),
            self.preset.value
        )
    }
}

impl Default for EditState {
    fn default() -> Self {
        Self::new(DEFAULT_TEXT.to_string(), None)
    }
}

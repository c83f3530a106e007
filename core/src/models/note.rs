use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default geometry for a freshly created note.
pub const DEFAULT_X: f64 = 200.0;
pub const DEFAULT_Y: f64 = 200.0;
pub const DEFAULT_WIDTH: f64 = 250.0;
pub const DEFAULT_HEIGHT: f64 = 200.0;

/// One checklist entry. Order within `NoteRecord::items` is meaningful.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NoteItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

impl NoteItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: false,
        }
    }
}

/// The persisted state of a single sticky note.
///
/// Field names are part of the on-disk format and must stay stable across
/// versions. Every field defaults individually so a document written by an
/// older or newer version still loads instead of failing wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    #[serde(default)]
    pub items: Vec<NoteItem>,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub collapsed: bool,

    /// Height to restore when expanding a collapsed note.
    #[serde(default = "default_height")]
    pub expanded_height: f64,

    #[serde(default = "default_x")]
    pub x: f64,
    #[serde(default = "default_y")]
    pub y: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_title() -> String {
    "Note".to_string()
}

fn default_x() -> f64 {
    DEFAULT_X
}

fn default_y() -> f64 {
    DEFAULT_Y
}

fn default_width() -> f64 {
    DEFAULT_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_HEIGHT
}

fn default_visible() -> bool {
    true
}

impl NoteRecord {
    /// Create a new note with a generated UUID and default geometry
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            items: Vec::new(),
            title: default_title(),
            collapsed: false,
            expanded_height: DEFAULT_HEIGHT,
            x: DEFAULT_X,
            y: DEFAULT_Y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            visible: true,
        }
    }

    /// Create a note at a specific position (for staggered placement)
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::new()
        }
    }
}

impl Default for NoteRecord {
    fn default() -> Self {
        Self::new()
    }
}

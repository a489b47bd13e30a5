//! Lesson catalog: the fixed sequence of signs to practice

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One vocabulary entry in the lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeItem {
    /// Stable identifier, e.g. `bonjour`
    pub id: String,
    /// Word shown to the child
    pub display_name: String,
    /// Spoken when the item comes up; defaults to the display name
    #[serde(default)]
    pub narration: Option<String>,
    #[serde(default)]
    pub emoji: String,
    /// How to form the sign
    #[serde(default)]
    pub description: String,
    /// 1 = easiest
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    /// Reference video shown next to the webcam
    #[serde(default)]
    pub video_url: Option<String>,
}

fn default_difficulty() -> u8 {
    1
}

impl PracticeItem {
    /// Text spoken when the item is presented
    pub fn narration(&self) -> &str {
        self.narration.as_deref().unwrap_or(&self.display_name)
    }
}

/// Errors loading a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no items")]
    Empty,

    #[error("duplicate item id: {0}")]
    DuplicateId(String),
}

/// Ordered, immutable list of practice items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<PracticeItem>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists and duplicate ids
    pub fn new(items: Vec<PracticeItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }

        Ok(Self { items })
    }

    /// Load a JSON array of items
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a JSON array of items
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let items: Vec<PracticeItem> = serde_json::from_str(raw)?;
        Self::new(items)
    }

    /// The first ten LSQ signs
    pub fn builtin() -> Self {
        let items = BUILTIN
            .iter()
            .map(|&(id, word, emoji, difficulty, description, video)| PracticeItem {
                id: id.to_string(),
                display_name: word.to_string(),
                narration: None,
                emoji: emoji.to_string(),
                description: description.to_string(),
                difficulty,
                video_url: Some(video.to_string()),
            })
            .collect();
        Self { items }
    }

    /// Keep items no harder than `max`, preserving order
    pub fn with_max_difficulty(&self, max: u8) -> Result<Self, CatalogError> {
        let items = self
            .items
            .iter()
            .filter(|item| item.difficulty <= max)
            .cloned()
            .collect();
        Self::new(items)
    }

    /// Look up an item by id
    pub fn get(&self, id: &str) -> Option<&PracticeItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Get the items in lesson order
    pub fn items(&self) -> &[PracticeItem] {
        &self.items
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the items in lesson order
    pub fn into_items(self) -> Vec<PracticeItem> {
        self.items
    }
}

type BuiltinEntry = (&'static str, &'static str, &'static str, u8, &'static str, &'static str);

const BUILTIN: &[BuiltinEntry] = &[
    (
        "bonjour",
        "Bonjour",
        "👋",
        1,
        "Main ouverte qui part du menton vers l'avant",
        "https://www.youtube.com/embed/Edp58-iP8-0?start=0&end=15",
    ),
    (
        "merci",
        "Merci",
        "🙏",
        1,
        "Main plate qui touche le menton et descend",
        "https://www.youtube.com/embed/tBWqxO2xfjc?start=30&end=45",
    ),
    (
        "sil-te-plait",
        "S'il te plaît",
        "🥺",
        2,
        "Main qui frotte la poitrine en cercle",
        "https://www.youtube.com/embed/tBWqxO2xfjc?start=60&end=75",
    ),
    (
        "au-revoir",
        "Au revoir",
        "👋",
        1,
        "Main qui fait bye-bye",
        "https://www.youtube.com/embed/Edp58-iP8-0?start=20&end=35",
    ),
    (
        "oui",
        "Oui",
        "✅",
        1,
        "Poing fermé qui hoche comme une tête",
        "https://www.youtube.com/embed/tBWqxO2xfjc?start=90&end=105",
    ),
    (
        "non",
        "Non",
        "❌",
        1,
        "Index et majeur qui se ferment sur le pouce",
        "https://www.youtube.com/embed/tBWqxO2xfjc?start=105&end=120",
    ),
    (
        "je-taime",
        "Je t'aime",
        "❤️",
        1,
        "Pouce, index et auriculaire levés (ILY)",
        "https://www.youtube.com/embed/nbnEplcGOZI?start=30&end=50",
    ),
    (
        "maman",
        "Maman",
        "👩",
        1,
        "Pouce sur le menton",
        "https://www.youtube.com/embed/nbnEplcGOZI?start=10&end=25",
    ),
    (
        "papa",
        "Papa",
        "👨",
        1,
        "Pouce sur le front",
        "https://www.youtube.com/embed/9Y-UdGqz4jo",
    ),
    (
        "bravo",
        "Bravo",
        "👏",
        1,
        "Applaudissements",
        "https://www.youtube.com/embed/slOzqp4TyoM?start=60&end=75",
    ),
];

//! Category classification by keyword groups.

use serde::{Deserialize, Serialize};

/// Category an annotation is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Servants,
    Characters,
    Locations,
    Items,
    Events,
    General,
}

/// Keyword groups in priority order. The first group with a keyword contained
/// in the annotation wins.
const KEYWORD_GROUPS: [(Category, &[&str]); 5] = [
    (Category::Servants, &["servant", "butler", "maid"]),
    (Category::Characters, &["character", "person", "npc"]),
    (Category::Locations, &["location", "place", "room"]),
    (Category::Items, &["item", "object", "weapon"]),
    (Category::Events, &["event", "quest", "mission"]),
];

impl Category {
    /// Every category, in classification priority order.
    pub const ALL: [Category; 6] = [
        Category::Servants,
        Category::Characters,
        Category::Locations,
        Category::Items,
        Category::Events,
        Category::General,
    ];

    /// Lowercase label used for record matching.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Servants => "servants",
            Category::Characters => "characters",
            Category::Locations => "locations",
            Category::Items => "items",
            Category::Events => "events",
            Category::General => "general",
        }
    }

    /// Whether annotations in this category describe people.
    pub fn is_person(&self) -> bool {
        matches!(self, Category::Servants | Category::Characters)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify an annotation. Never fails; unmatched text is `General`.
pub fn classify(annotation: &str) -> Category {
    let lower = annotation.to_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

//! Record definitions - the atomic persisted unit of the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique handle for records held by a store.
///
/// The host-visible identity of a record is its title; the handle exists so
/// components can refer to a record across mutations of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Create a new random record ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil record ID.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two text buffers of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Buffer {
    Primary,
    Secondary,
}

impl Buffer {
    /// Both buffers, primary first.
    pub const ALL: [Buffer; 2] = [Buffer::Primary, Buffer::Secondary];
}

/// A persisted record.
///
/// The body is split across a primary and a secondary buffer. Both count
/// toward the same character limit, see [`Record::char_len`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: RecordId,

    pub title: String,

    /// Free-form type tag assigned by whoever created the record.
    #[serde(default)]
    pub type_tag: String,

    /// Category label used when matching roster records.
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub search_terms: Vec<String>,

    #[serde(default)]
    pub primary: String,

    #[serde(default)]
    pub secondary: String,

    #[serde(default = "default_visible")]
    pub visible: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_visible() -> bool {
    true
}

impl Record {
    /// Create a new empty, visible record.
    pub fn new(title: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            title: title.into(),
            type_tag: type_tag.into(),
            category: None,
            search_terms: Vec::new(),
            primary: String::new(),
            secondary: String::new(),
            visible: true,
            created_at: Utc::now(),
        }
    }

    /// Set the category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the search terms.
    pub fn with_search_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_terms = terms.into_iter().map(Into::into).collect();
        self
    }

    /// Set the primary buffer.
    pub fn with_primary(mut self, text: impl Into<String>) -> Self {
        self.primary = text.into();
        self
    }

    /// Set the secondary buffer.
    pub fn with_secondary(mut self, text: impl Into<String>) -> Self {
        self.secondary = text.into();
        self
    }

    /// Set the display flag.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Borrow one buffer.
    pub fn buffer(&self, buffer: Buffer) -> &str {
        match buffer {
            Buffer::Primary => &self.primary,
            Buffer::Secondary => &self.secondary,
        }
    }

    /// Mutably borrow one buffer.
    pub fn buffer_mut(&mut self, buffer: Buffer) -> &mut String {
        match buffer {
            Buffer::Primary => &mut self.primary,
            Buffer::Secondary => &mut self.secondary,
        }
    }

    /// The combined body, primary followed by secondary.
    pub fn text(&self) -> String {
        let mut text = String::with_capacity(self.primary.len() + self.secondary.len());
        text.push_str(&self.primary);
        text.push_str(&self.secondary);
        text
    }

    /// Combined body length in characters.
    pub fn char_len(&self) -> usize {
        self.primary.chars().count() + self.secondary.chars().count()
    }

    /// Whether the combined body has reached `limit` characters.
    pub fn is_full(&self, limit: usize) -> bool {
        self.char_len() >= limit
    }

    /// Whether `needle` occurs verbatim in the combined body.
    pub fn body_contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// Case-insensitive substring test against title, category and body.
    pub fn mentions(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&term))
            || self.text().to_lowercase().contains(&term)
    }
}

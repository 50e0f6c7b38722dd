//! Roster records - category lists that hold either numbered slots or
//! bulleted lines, split across numbered continuation records as they fill.
//!
//! The pipeline for one annotation:
//! 1. **Locate**: find a writable roster record for the category, or allocate one
//! 2. **Write**: fill the first empty slot, or append a bulleted line
//! 3. **Overflow**: when the record cannot take the value, allocate the next
//!    continuation record (`<base name> <n+1>`) and write there instead

mod locator;
mod slot;
mod writer;

pub use locator::*;
pub use slot::*;
pub use writer::*;

use record_store::{Buffer, Record, RecordId, RecordStore};

use crate::config::{Config, Policy};

/// Title keywords that mark an untagged record as a roster.
pub const ROSTER_TITLE_KEYWORDS: [&str; 6] = [
    "list",
    "inventory",
    "characters",
    "locations",
    "items",
    "servant",
];

/// What a record is, judged by its type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Roster,
    Profile,
    Settings,
    Sheet,
    /// Created outside this system with a tag we do not manage.
    Unmanaged,
}

/// Classify a record by its type tag.
pub fn kind_of(record: &Record, config: &Config, policy: &Policy) -> RecordKind {
    let tag = record.type_tag.as_str();
    if tag == config.roster_type {
        RecordKind::Roster
    } else if tag == config.profile_type {
        RecordKind::Profile
    } else if tag == policy.settings_type {
        RecordKind::Settings
    } else if tag == policy.sheet_type {
        RecordKind::Sheet
    } else {
        RecordKind::Unmanaged
    }
}

/// Whether a record is a roster, either by tag or, for unmanaged records,
/// by a title keyword.
pub fn is_roster(record: &Record, config: &Config, policy: &Policy) -> bool {
    match kind_of(record, config, policy) {
        RecordKind::Roster => true,
        RecordKind::Unmanaged => {
            let title = record.title.to_lowercase();
            ROSTER_TITLE_KEYWORDS.iter().any(|k| title.contains(k))
        }
        _ => false,
    }
}

/// Handles of all roster records in store order.
pub fn roster_ids<S>(store: &S, config: &Config, policy: &Policy) -> Vec<RecordId>
where
    S: RecordStore + ?Sized,
{
    store
        .all()
        .into_iter()
        .filter(|r| is_roster(r, config, policy))
        .map(|r| r.id)
        .collect()
}

/// How a roster record stores its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterLayout {
    /// Numbered `{Word N: value}` slots.
    Templated { slot_word: String },
    /// `• value` lines.
    Bulleted,
}

/// Layout of an existing record: templated if any slot appears in its body.
pub fn layout_of(record: &Record) -> RosterLayout {
    Buffer::ALL
        .iter()
        .find_map(|&buffer| parse_slots(record.buffer(buffer)).first().map(|s| s.word.to_string()))
        .map(|slot_word| RosterLayout::Templated { slot_word })
        .unwrap_or(RosterLayout::Bulleted)
}

/// Base name of the records allocated for `category`.
pub fn base_name_for_category(category: &str) -> String {
    match category.to_lowercase().as_str() {
        "servants" | "servant" => "Servants List".to_string(),
        "characters" | "character" => "Characters List".to_string(),
        "locations" | "location" => "Locations List".to_string(),
        "items" | "item" => "Items List".to_string(),
        "events" | "event" => "Events List".to_string(),
        _ => format!("{} List", capitalize(category)),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip a trailing ` <number>` from a title: `"Servants List 3"` → `"Servants List"`.
pub fn base_name_of(title: &str) -> &str {
    let without_digits = title.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == title.len() {
        return title;
    }
    let trimmed = without_digits.trim_end();
    if trimmed.len() == without_digits.len() {
        title
    } else {
        trimmed
    }
}

/// Trailing number of a title, if any.
pub fn title_number(title: &str) -> Option<u32> {
    let without_digits = title.trim_end_matches(|c: char| c.is_ascii_digit());
    title[without_digits.len()..].parse().ok()
}

/// Slot name derived from a base name: the head word without a trailing `s`.
pub fn slot_word_for(base_name: &str) -> String {
    match base_name.split_whitespace().next() {
        Some(head) => head.strip_suffix('s').unwrap_or(head).to_string(),
        None => "Item".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_of() {
        let config = Config::default();
        let policy = Policy::default();

        assert_eq!(kind_of(&Record::new("a", "Lists"), &config, &policy), RecordKind::Roster);
        assert_eq!(kind_of(&Record::new("a", "character"), &config, &policy), RecordKind::Profile);
        assert_eq!(kind_of(&Record::new("a", "settings"), &config, &policy), RecordKind::Settings);
        assert_eq!(
            kind_of(&Record::new("a", "Character Sheet"), &config, &policy),
            RecordKind::Sheet
        );
        assert_eq!(kind_of(&Record::new("a", "text"), &config, &policy), RecordKind::Unmanaged);
    }

    #[test]
    fn test_is_roster_title_heuristic() {
        let config = Config::default();
        let policy = Policy::default();

        assert!(is_roster(&Record::new("Party Inventory", "text"), &config, &policy));
        assert!(is_roster(&Record::new("Servant roster", ""), &config, &policy));
        assert!(!is_roster(&Record::new("Weather", "text"), &config, &policy));
        // Tagged records never fall back to the heuristic.
        assert!(!is_roster(&Record::new("Characters List", "character"), &config, &policy));
    }

    #[test]
    fn test_layout_of() {
        let templated = Record::new("Servants List 1", "Lists").with_primary("- {Servant 1: Anna}\n");
        assert_eq!(
            layout_of(&templated),
            RosterLayout::Templated {
                slot_word: "Servant".to_string()
            }
        );

        let bulleted = Record::new("Locations List 1", "Lists").with_primary("• The hall\n");
        assert_eq!(layout_of(&bulleted), RosterLayout::Bulleted);
    }

    #[test]
    fn test_base_names() {
        assert_eq!(base_name_for_category("servants"), "Servants List");
        assert_eq!(base_name_for_category("Character"), "Characters List");
        assert_eq!(base_name_for_category("general"), "General List");
        assert_eq!(base_name_for_category("lore"), "Lore List");

        assert_eq!(base_name_of("Servants List 12"), "Servants List");
        assert_eq!(base_name_of("Servants List"), "Servants List");
        assert_eq!(base_name_of("List10"), "List10");
    }

    #[test]
    fn test_title_number() {
        assert_eq!(title_number("Servants List 3"), Some(3));
        assert_eq!(title_number("Servants List"), None);
        assert_eq!(title_number("List10"), Some(10));
    }

    #[test]
    fn test_slot_word_for() {
        assert_eq!(slot_word_for("Servants List"), "Servant");
        assert_eq!(slot_word_for("Staff List"), "Staff");
        assert_eq!(slot_word_for(""), "Item");
    }
}

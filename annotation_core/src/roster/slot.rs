//! Slot parsing - `{Word N: value}` positions inside templated roster bodies.

/// A slot found in a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    /// Slot name, e.g. `Servant`.
    pub word: &'a str,
    pub number: u32,
    /// Trimmed value; empty for an unfilled slot.
    pub value: &'a str,
    /// Byte offset of the opening brace.
    pub start: usize,
    /// Byte offset just past the closing brace.
    pub end: usize,
}

impl Slot<'_> {
    /// Whether the slot is unfilled.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Try to parse a slot whose opening brace is at `start`.
fn parse_slot_at(text: &str, start: usize) -> Option<Slot<'_>> {
    let rest = text.get(start..)?.strip_prefix('{')?;
    let base = start + 1;

    let after_ws = rest.trim_start();
    let mut offset = rest.len() - after_ws.len();

    let word_len = after_ws
        .find(|c: char| !is_word_char(c))
        .unwrap_or(after_ws.len());
    if word_len == 0 {
        return None;
    }
    let word = &after_ws[..word_len];
    offset += word_len;

    let after_word = &rest[offset..];
    let gap = after_word.len() - after_word.trim_start().len();
    if gap == 0 {
        return None;
    }
    offset += gap;

    let digits = &rest[offset..];
    let digits_len = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if digits_len == 0 {
        return None;
    }
    let number = digits[..digits_len].parse().ok()?;
    offset += digits_len;

    let value_part = rest[offset..].strip_prefix(':')?;
    offset += 1;

    let close = value_part.find(|c| matches!(c, '}' | '{' | '\n'))?;
    if !value_part[close..].starts_with('}') {
        return None;
    }
    let value = value_part[..close].trim();

    Some(Slot {
        word,
        number,
        value,
        start,
        end: base + offset + close + 1,
    })
}

/// All slots in `text`, in order.
pub fn parse_slots(text: &str) -> Vec<Slot<'_>> {
    let mut slots = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('{') {
        let brace = cursor + offset;
        match parse_slot_at(text, brace) {
            Some(slot) => {
                cursor = slot.end;
                slots.push(slot);
            }
            None => cursor = brace + 1,
        }
    }

    slots
}

/// The first unfilled slot in `text`.
pub fn first_empty_slot(text: &str) -> Option<Slot<'_>> {
    parse_slots(text).into_iter().find(Slot::is_empty)
}

/// Whether `text` contains any slot, filled or not.
pub fn has_slots(text: &str) -> bool {
    !parse_slots(text).is_empty()
}

/// Render a slot. An empty `value` renders an unfilled slot.
pub fn render_slot(word: &str, number: u32, value: &str) -> String {
    format!("{{{word} {number}: {value}}}")
}

/// Build a templated roster body: a header line then `count` empty slots.
pub fn template_body(header: &str, word: &str, count: usize) -> String {
    let mut body = format!("{header}\n");
    for number in 1..=count {
        body.push_str("- ");
        body.push_str(&render_slot(word, number as u32, ""));
        body.push('\n');
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_and_filled_slots() {
        let text = "Header\n- {Servant 1: Anna}\n- {Servant 2:}\n- {Servant 3: }\n";
        let slots = parse_slots(text);

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].word, "Servant");
        assert_eq!(slots[0].number, 1);
        assert_eq!(slots[0].value, "Anna");
        assert!(!slots[0].is_empty());
        assert!(slots[1].is_empty());
        assert!(slots[2].is_empty());
        assert_eq!(&text[slots[1].start..slots[1].end], "{Servant 2:}");
    }

    #[test]
    fn test_first_empty_slot() {
        let text = "- {Servant 1: Anna}\n- {Servant 2: }\n- {Servant 3: }";
        let slot = first_empty_slot(text).unwrap();
        assert_eq!(slot.number, 2);

        assert!(first_empty_slot("- {Servant 1: Anna}").is_none());
    }

    #[test]
    fn test_rejects_non_slots() {
        assert!(parse_slots("{Servant: }").is_empty());
        assert!(parse_slots("{ 1: }").is_empty());
        assert!(parse_slots("{Servant1: }").is_empty());
        assert!(parse_slots("{Servant 1 }").is_empty());
        assert!(parse_slots("{Servant 1: open\n}").is_empty());
        assert!(parse_slots("${Your Name}").is_empty());
    }

    #[test]
    fn test_whitespace_tolerance() {
        let slots = parse_slots("{  Maid   4:   Rosa  }");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].word, "Maid");
        assert_eq!(slots[0].number, 4);
        assert_eq!(slots[0].value, "Rosa");
    }

    #[test]
    fn test_template_body() {
        let body = template_body("This is a list.", "Servant", 3);
        assert_eq!(
            body,
            "This is a list.\n- {Servant 1: }\n- {Servant 2: }\n- {Servant 3: }\n"
        );
        assert!(has_slots(&body));
        assert_eq!(parse_slots(&body).iter().filter(|s| s.is_empty()).count(), 3);
    }

    #[test]
    fn test_render_slot() {
        assert_eq!(render_slot("Servant", 1, "James"), "{Servant 1: James}");
        assert_eq!(render_slot("Servant", 10, ""), "{Servant 10: }");
    }
}

//! Roster writer - puts a value into a roster record without ever pushing the
//! record past the capacity limit.

use record_store::{Buffer, Record, RecordId, RecordStore};
use tracing::{debug, info, warn};

use super::{base_name_of, first_empty_slot, layout_of, render_slot, RosterLayout, RosterLocator};
use crate::config::{Config, Policy};
use crate::error::PipelineError;

/// Where a written value ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The value was already in the record; nothing changed.
    AlreadyPresent,
    /// Filled slot `number`.
    Slot { number: u32 },
    /// Appended as a bulleted line to this buffer.
    Bullet(Buffer),
    /// Not even a fresh record had room for any of the value.
    Dropped,
}

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The record that holds the value, which differs from the target when
    /// the write overflowed into a continuation record.
    pub record: RecordId,
    pub placement: Placement,
    /// Whether the value was cut short to fit a fresh record.
    pub truncated: bool,
}

/// Writes values into roster records.
pub struct RosterWriter<'a> {
    config: &'a Config,
    policy: &'a Policy,
}

/// Make a value safe to place inside `{Word N: value}`.
pub fn slot_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('{', "(")
        .replace('}', ")")
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

impl<'a> RosterWriter<'a> {
    pub fn new(config: &'a Config, policy: &'a Policy) -> Self {
        Self { config, policy }
    }

    /// Write `value` into record `id`.
    ///
    /// Templated records get the value in their first empty slot; bulleted
    /// records get a `• value` line. When the record cannot take the value,
    /// it is written to a newly allocated continuation record and `id` is
    /// left unchanged.
    pub fn write<S>(&self, store: &mut S, id: RecordId, value: &str) -> Result<WriteOutcome, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        self.write_into(store, id, value, false)
    }

    fn write_into<S>(
        &self,
        store: &mut S,
        id: RecordId,
        value: &str,
        fresh: bool,
    ) -> Result<WriteOutcome, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        let record = store.get(id)?;
        let layout = layout_of(record);
        let already_present = record.body_contains(value)
            || (matches!(layout, RosterLayout::Templated { .. })
                && record.body_contains(&slot_value(value)));
        if already_present {
            debug!(record = %record.title, "value already present, skipping");
            return Ok(WriteOutcome {
                record: id,
                placement: Placement::AlreadyPresent,
                truncated: false,
            });
        }

        let record = store.get_mut(id)?;
        let placed = match layout {
            RosterLayout::Templated { .. } => self
                .fill_slot(record, value, fresh)
                .or_else(|| fresh.then(|| self.append_bullet(record, value, true)).flatten()),
            RosterLayout::Bulleted => self.append_bullet(record, value, fresh),
        };

        if let Some((placement, truncated)) = placed {
            if truncated {
                warn!(record = %record.title, "value truncated to fit the capacity limit");
            }
            return Ok(WriteOutcome {
                record: id,
                placement,
                truncated,
            });
        }

        let base_name = base_name_of(&record.title).to_string();
        let category = record.category.clone();
        info!(record = %record.title, "record cannot take value, allocating continuation");

        let locator = RosterLocator::new(self.config, self.policy);
        let next = locator.allocate(store, &base_name, layout, category.as_deref())?;
        self.write_into(store, next, value, true)
    }

    /// Fill the first empty slot. With `truncate`, a value too long for the
    /// remaining capacity is cut to fit instead of rejected.
    fn fill_slot(&self, record: &mut Record, value: &str, truncate: bool) -> Option<(Placement, bool)> {
        let limit = self.config.capacity_limit;
        let value = slot_value(value);
        let current_len = record.char_len();

        for buffer in Buffer::ALL {
            let text = record.buffer(buffer);
            let Some(slot) = first_empty_slot(text) else {
                continue;
            };
            let (start, end, number) = (slot.start, slot.end, slot.number);
            let word = slot.word.to_string();

            let slot_chars = text[start..end].chars().count();
            let empty_chars = render_slot(&word, number, "").chars().count();
            let available = limit.saturating_sub(current_len - slot_chars + empty_chars);

            let (value, truncated) = if value.chars().count() <= available {
                (value, false)
            } else if truncate {
                (truncate_chars(&value, available).trim_end().to_string(), true)
            } else {
                return None;
            };
            if value.is_empty() {
                return Some((Placement::Dropped, truncated));
            }

            let rendered = render_slot(&word, number, &value);
            record.buffer_mut(buffer).replace_range(start..end, &rendered);
            debug!(record = %record.title, slot = number, "filled slot");
            return Some((Placement::Slot { number }, truncated));
        }

        None
    }

    /// Per-buffer share of the capacity limit.
    fn quota(&self, buffer: Buffer) -> usize {
        let limit = self.config.capacity_limit;
        match buffer {
            Buffer::Primary => limit - limit / 2,
            Buffer::Secondary => limit / 2,
        }
    }

    fn fits(&self, record: &Record, buffer: Buffer, added: usize) -> bool {
        record.buffer(buffer).chars().count() + added <= self.quota(buffer)
            && record.char_len() + added <= self.config.capacity_limit
    }

    /// Append a bulleted line to the first buffer with room. With
    /// `truncate`, the value is cut to fit the primary buffer instead.
    fn append_bullet(&self, record: &mut Record, value: &str, truncate: bool) -> Option<(Placement, bool)> {
        let line = format!("• {value}\n");
        let line_chars = line.chars().count();

        if let Some(buffer) = Buffer::ALL
            .into_iter()
            .find(|&buffer| self.fits(record, buffer, line_chars))
        {
            record.buffer_mut(buffer).push_str(&line);
            debug!(record = %record.title, buffer = ?buffer, "appended bulleted line");
            return Some((Placement::Bullet(buffer), false));
        }

        if !truncate {
            return None;
        }

        let primary_room = self
            .quota(Buffer::Primary)
            .saturating_sub(record.primary.chars().count());
        let total_room = self.config.capacity_limit.saturating_sub(record.char_len());
        let available = primary_room.min(total_room).saturating_sub(3);
        let value = truncate_chars(value, available);
        let value = value.trim_end();
        if value.is_empty() {
            return Some((Placement::Dropped, true));
        }

        record.primary.push_str(&format!("• {value}\n"));
        Some((Placement::Bullet(Buffer::Primary), true))
    }
}

//! Roster locator - picks the record an annotation is written to, allocating
//! numbered records when no existing one can take it.

use std::collections::BTreeSet;

use record_store::{Buffer, Record, RecordId, RecordStore};
use tracing::{debug, info, warn};

use super::{
    base_name_for_category, base_name_of, first_empty_slot, is_roster, layout_of, slot_word_for,
    template_body, title_number, RosterLayout,
};
use crate::config::{Config, Policy};
use crate::error::PipelineError;

/// Finds or allocates writable roster records.
pub struct RosterLocator<'a> {
    config: &'a Config,
    policy: &'a Policy,
}

impl<'a> RosterLocator<'a> {
    pub fn new(config: &'a Config, policy: &'a Policy) -> Self {
        Self { config, policy }
    }

    /// Whether a record's title, category or body mentions `category`,
    /// directly or through a configured alias.
    pub fn matches_category(&self, record: &Record, category: &str) -> bool {
        record.mentions(category)
            || self
                .policy
                .aliases_for(category)
                .any(|alias| record.mentions(alias))
    }

    /// Whether a record can take another entry without allocating.
    ///
    /// Templated records need an empty slot; bulleted records only need to be
    /// under the capacity limit.
    pub fn is_writable(&self, record: &Record) -> bool {
        if record.is_full(self.config.capacity_limit) {
            return false;
        }
        match layout_of(record) {
            RosterLayout::Templated { .. } => Buffer::ALL
                .iter()
                .any(|&buffer| first_empty_slot(record.buffer(buffer)).is_some()),
            RosterLayout::Bulleted => true,
        }
    }

    /// Whether the record was allocated for `category` itself: its stored
    /// category or its title's base name is the one `category` allocates.
    pub fn owns_category(&self, record: &Record, category: &str) -> bool {
        record
            .category
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(category))
            || base_name_of(&record.title).eq_ignore_ascii_case(&base_name_for_category(category))
    }

    /// Whether `record` may receive a `category` entry.
    ///
    /// A templated record is picked only when `category` itself allocates
    /// templated records, and may be found through title, body text or an
    /// alias. A bulleted record is picked only when it belongs to `category`.
    fn accepts(&self, record: &Record, category: &str, expected: &RosterLayout) -> bool {
        let shape_fits = match (layout_of(record), expected) {
            (RosterLayout::Templated { .. }, RosterLayout::Templated { .. }) => {
                self.matches_category(record, category)
            }
            (RosterLayout::Templated { .. }, RosterLayout::Bulleted) => false,
            (RosterLayout::Bulleted, _) => self.owns_category(record, category),
        };
        shape_fits && self.is_writable(record)
    }

    /// First writable roster record for `category`, in store order.
    pub fn find_writable<S>(&self, store: &S, category: &str) -> Option<RecordId>
    where
        S: RecordStore + ?Sized,
    {
        let base_name = base_name_for_category(category);
        let expected = self.layout_for_category(category, &base_name);
        store
            .all()
            .into_iter()
            .filter(|r| is_roster(r, self.config, self.policy))
            .find(|r| self.accepts(r, category, &expected))
            .map(|r| r.id)
    }

    /// Return a writable record for `category`, allocating one if needed.
    pub fn locate<S>(&self, store: &mut S, category: &str) -> Result<RecordId, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        if let Some(id) = self.find_writable(store, category) {
            debug!(category, record = %id, "located roster record");
            return Ok(id);
        }

        let base_name = base_name_for_category(category);
        let layout = self.layout_for_category(category, &base_name);
        self.allocate(store, &base_name, layout, Some(category))
    }

    /// Layout of a freshly allocated record for `category`.
    pub fn layout_for_category(&self, category: &str, base_name: &str) -> RosterLayout {
        let lower = category.to_lowercase();
        if lower.contains("servant") || lower.contains("list") {
            RosterLayout::Templated {
                slot_word: slot_word_for(base_name),
            }
        } else {
            RosterLayout::Bulleted
        }
    }

    /// Number for the next record titled `<base_name> <n>`: one past the
    /// highest number among titles starting with `base_name`, where a title
    /// without a number counts as 1. When the highest number is `u32::MAX`
    /// the lowest number not yet taken is used instead.
    ///
    /// Returns `None` only when every number is taken.
    pub fn next_number<S>(store: &S, base_name: &str) -> Option<u32>
    where
        S: RecordStore + ?Sized,
    {
        let taken: BTreeSet<u32> = store
            .all()
            .iter()
            .filter(|r| r.title.starts_with(base_name))
            .map(|r| title_number(&r.title).unwrap_or(1))
            .collect();

        match taken.last() {
            None => Some(1),
            Some(&highest) => highest
                .checked_add(1)
                .or_else(|| (1..=u32::MAX).find(|n| !taken.contains(n))),
        }
    }

    /// Allocate a new roster record `<base_name> <n>` at the end of the store.
    pub fn allocate<S>(
        &self,
        store: &mut S,
        base_name: &str,
        layout: RosterLayout,
        category: Option<&str>,
    ) -> Result<RecordId, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        let number = Self::next_number(store, base_name)
            .ok_or_else(|| PipelineError::NumbersExhausted(base_name.to_string()))?;
        let title = format!("{base_name} {number}");

        let mut record = Record::new(title.clone(), self.config.roster_type.clone())
            .with_search_terms(base_name.to_lowercase().split_whitespace())
            .with_primary(self.initial_body(base_name, &layout));
        if let Some(category) = category {
            record = record.with_category(category);
        }

        info!(title = %title, layout = ?layout, "allocated roster record");
        Ok(store.add(record))
    }

    /// Seed body for a new record, degraded when the template alone would
    /// not fit the capacity limit.
    fn initial_body(&self, base_name: &str, layout: &RosterLayout) -> String {
        let limit = self.config.capacity_limit;
        let continued = format!("{base_name} (continued)\n\n");

        if let RosterLayout::Templated { slot_word } = layout {
            let header = format!("This is a list of the names in {base_name}.");
            let body = template_body(&header, slot_word, self.policy.slot_count);
            if body.chars().count() <= limit {
                return body;
            }
            warn!(base_name, limit, "slot template exceeds the capacity limit, using a bulleted record");
        }

        if continued.chars().count() <= limit {
            continued
        } else {
            String::new()
        }
    }
}

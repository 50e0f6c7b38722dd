//! Profile records - one record per named person, created once and then only
//! appended to.

use std::collections::BTreeSet;

use record_store::{Record, RecordId, RecordStore};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::PipelineError;

/// Capitalized words that never count as a name.
pub const STOP_WORDS: [&str; 10] = ["The", "A", "An", "In", "On", "At", "To", "For", "With", "By"];

/// Pick the first name-like token of an annotation.
///
/// Tokens are trimmed of surrounding punctuation. A token qualifies when it
/// is longer than one character, starts with an uppercase letter and is not
/// a stop word.
pub fn extract_name(annotation: &str) -> Option<String> {
    annotation
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|token| {
            token.chars().count() > 1
                && token.chars().next().is_some_and(char::is_uppercase)
                && !STOP_WORDS.iter().any(|stop| stop.eq_ignore_ascii_case(token))
        })
        .map(str::to_string)
}

/// What [`ProfileDeriver::derive`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// The name was already handled this session.
    Skipped,
    Created(RecordId),
    Appended(RecordId),
    /// The profile existed and already held the info.
    Unchanged(RecordId),
}

/// Creates and updates profile records.
pub struct ProfileDeriver<'a> {
    config: &'a Config,
}

impl<'a> ProfileDeriver<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// The profile titled exactly `name`.
    pub fn find_profile<'s, S>(&self, store: &'s S, name: &str) -> Option<&'s Record>
    where
        S: RecordStore + ?Sized,
    {
        store
            .all()
            .into_iter()
            .find(|r| r.type_tag == self.config.profile_type && r.title == name)
    }

    /// Titles of all profile records in store order.
    pub fn profile_names<S>(&self, store: &S) -> Vec<String>
    where
        S: RecordStore + ?Sized,
    {
        store
            .all()
            .into_iter()
            .filter(|r| r.type_tag == self.config.profile_type)
            .map(|r| r.title.clone())
            .collect()
    }

    /// Add a new profile record for `name` seeded with `info`.
    pub fn create_profile<S>(&self, store: &mut S, name: &str, info: &str) -> RecordId
    where
        S: RecordStore + ?Sized,
    {
        let record = Record::new(name, self.config.profile_type.clone())
            .with_search_terms([name.to_lowercase()])
            .with_primary(format!("Character: {name}\n\n{info}"));
        info!(name, "created profile record");
        store.add(record)
    }

    /// Create or update the profile for `name`, at most once per session.
    ///
    /// `created` is the session's set of handled names and gains `name`
    /// unless the call is skipped.
    pub fn derive<S>(
        &self,
        store: &mut S,
        created: &mut BTreeSet<String>,
        name: &str,
        info: &str,
    ) -> Result<ProfileOutcome, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        if created.contains(name) {
            return Ok(ProfileOutcome::Skipped);
        }

        let existing = self.find_profile(store, name).map(|r| r.id);
        let outcome = match existing {
            Some(id) => {
                let record = store.get_mut(id)?;
                if record.body_contains(info) {
                    ProfileOutcome::Unchanged(id)
                } else {
                    record.primary.push('\n');
                    record.primary.push_str(info);
                    debug!(name, "appended to profile record");
                    ProfileOutcome::Appended(id)
                }
            }
            None => ProfileOutcome::Created(self.create_profile(store, name, info)),
        };

        created.insert(name.to_string());
        Ok(outcome)
    }

    /// Derive a profile from an annotation, naming it after the first
    /// name-like token. Returns `None` when no name is found.
    pub fn derive_from_annotation<S>(
        &self,
        store: &mut S,
        created: &mut BTreeSet<String>,
        annotation: &str,
    ) -> Result<Option<ProfileOutcome>, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        match extract_name(annotation) {
            Some(name) => self.derive(store, created, &name, annotation).map(Some),
            None => Ok(None),
        }
    }
}

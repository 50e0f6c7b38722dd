//! Sheet bulk initialization - fills the servants roster and their profiles
//! from a host-provided sheet record, once per session.

use std::collections::BTreeSet;

use record_store::{Record, RecordId, RecordStore};
use tracing::{debug, info};

use crate::config::{Config, Policy};
use crate::error::PipelineError;
use crate::profile::ProfileDeriver;
use crate::roster::{kind_of, RecordKind, RosterLocator, RosterWriter};

/// Field holding the comma-separated relationship list.
pub const SUBORDINATES_FIELD: &str = "Subordinate(s):";

/// Field holding the sheet owner's name.
pub const NAME_FIELD: &str = "Name:";

const GENDER_FIELD: &str = "Gender:";

/// Marker of an unexpanded host placeholder.
const PLACEHOLDER: &str = "${";

/// Whether a record looks like a sheet.
///
/// Records managed by this crate never count, whatever their content.
pub fn is_sheet(record: &Record, config: &Config, policy: &Policy) -> bool {
    match kind_of(record, config, policy) {
        RecordKind::Sheet => true,
        RecordKind::Unmanaged => {
            let text = record.text();
            text.contains(SUBORDINATES_FIELD)
                || (text.contains(NAME_FIELD) && text.contains(GENDER_FIELD))
                || record.title.to_lowercase().contains("character sheet")
        }
        _ => false,
    }
}

/// First sheet record in store order.
pub fn find_sheet<'s, S>(store: &'s S, config: &Config, policy: &Policy) -> Option<&'s Record>
where
    S: RecordStore + ?Sized,
{
    store.all().into_iter().find(|r| is_sheet(r, config, policy))
}

/// Value of `field` up to the end of its line, matched case-insensitively.
pub fn field_value<'t>(text: &'t str, field: &str) -> Option<&'t str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let start = lower.find(&field.to_ascii_lowercase())? + field.len();
    let rest = &text[start..];
    let end = rest.find(|c| matches!(c, '\n' | '\r')).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Names listed in the subordinates field. Empty when the field is missing,
/// blank or still a placeholder.
pub fn subordinates(text: &str) -> Vec<String> {
    match field_value(text, SUBORDINATES_FIELD) {
        Some(value) if !value.is_empty() && !value.contains(PLACEHOLDER) && !value.contains('(') => value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// The sheet owner's declared name, or `fallback` when absent or a placeholder.
pub fn owner_name<'t>(text: &'t str, fallback: &'t str) -> &'t str {
    match field_value(text, NAME_FIELD) {
        Some(name) if !name.is_empty() && !name.contains(PLACEHOLDER) => name,
        _ => fallback,
    }
}

/// Result of a successful bulk initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkInit {
    pub roster: RecordId,
    /// Names written to the roster, in order.
    pub names: Vec<String>,
    pub owner: String,
}

/// Runs the one-time sheet initialization.
pub struct BulkInitializer<'a> {
    config: &'a Config,
    policy: &'a Policy,
}

impl<'a> BulkInitializer<'a> {
    pub fn new(config: &'a Config, policy: &'a Policy) -> Self {
        Self { config, policy }
    }

    /// Initialize from the first sheet record, unless `initialized` is set.
    ///
    /// Sets `initialized` only when names were found and written. Returns
    /// `None` when there was nothing to do.
    pub fn run<S>(
        &self,
        store: &mut S,
        created: &mut BTreeSet<String>,
        initialized: &mut bool,
    ) -> Result<Option<BulkInit>, PipelineError>
    where
        S: RecordStore + ?Sized,
    {
        if *initialized {
            return Ok(None);
        }

        let Some(sheet) = find_sheet(store, self.config, self.policy) else {
            debug!("no sheet record found, skipping bulk initialization");
            return Ok(None);
        };
        let text = sheet.text();
        let mut names = subordinates(&text);
        if names.is_empty() {
            debug!(sheet = %sheet.title, "sheet lists no subordinates");
            return Ok(None);
        }
        names.truncate(self.policy.bulk_init_cap);
        let owner = owner_name(&text, &self.policy.owner_fallback).to_string();

        let locator = RosterLocator::new(self.config, self.policy);
        let writer = RosterWriter::new(self.config, self.policy);
        let roster = locator.locate(store, "servants")?;

        let mut target = roster;
        for name in &names {
            target = writer.write(store, target, name)?.record;
        }

        if self.config.auto_profiles {
            let deriver = ProfileDeriver::new(self.config);
            let description = self.policy.describe_owner(&owner);
            for name in &names {
                deriver.derive(store, created, name, &description)?;
            }
        }

        *initialized = true;
        info!(count = names.len(), owner = %owner, "initialized servants from sheet");
        Ok(Some(BulkInit { roster, names, owner }))
    }
}

//! The settings record - shows the current flags to the operator and carries
//! the saved session state in its secondary buffer.

use record_store::{Record, RecordId, RecordStore};
use tracing::{debug, info, warn};

use crate::commands::command_lines;
use crate::config::{Config, Policy};
use crate::error::PipelineError;
use crate::session::SessionState;

/// Whether a record is a settings record, by type tag or title.
pub fn is_settings(record: &Record, policy: &Policy) -> bool {
    record.type_tag == policy.settings_type || record.title == policy.settings_title
}

/// First settings record in store order.
pub fn find_settings<'s, S>(store: &'s S, policy: &Policy) -> Option<&'s Record>
where
    S: RecordStore + ?Sized,
{
    store.all().into_iter().find(|r| is_settings(r, policy))
}

/// Operator-facing body of the settings record.
pub fn render(config: &Config, policy: &Policy) -> String {
    format!(
        "{title}\n\n\
         Current Settings:\n\
         • Enabled: {enabled}\n\
         • Auto-detect Information: {auto_detect}\n\
         • Auto-create Profiles: {auto_profiles}\n\
         • Remove Duplicates: {remove_duplicates}\n\
         • Debug Mode: {debug}\n\
         • Capacity Limit: {limit} characters\n\n\
         Usage:\n\
         Place information between #-- --# markers in your story to file it into roster records.\n\n\
         Commands:\n{commands}\n\
         This record is managed automatically.",
        title = policy.settings_title,
        enabled = config.enabled,
        auto_detect = config.auto_detect,
        auto_profiles = config.auto_profiles,
        remove_duplicates = config.remove_duplicates,
        debug = config.debug,
        limit = config.capacity_limit,
        commands = command_lines(&policy.command_prefix),
    )
}

/// Add a new settings record holding `state`.
pub fn create<S>(store: &mut S, state: &SessionState, policy: &Policy) -> Result<RecordId, PipelineError>
where
    S: RecordStore + ?Sized,
{
    let mut terms: Vec<String> = policy
        .settings_title
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    terms.push("config".to_string());

    let record = Record::new(policy.settings_title.clone(), policy.settings_type.clone())
        .with_search_terms(terms)
        .with_primary(render(&state.config, policy))
        .with_secondary(state.to_json()?);
    info!(title = %record.title, "created settings record");
    Ok(store.add(record))
}

/// Outcome of [`ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ensured {
    pub id: RecordId,
    /// Whether the record had to be created.
    pub created: bool,
}

/// Make sure exactly one settings record exists.
///
/// Among duplicates the newest by creation time is kept. The kept record is
/// rewritten from `state` and, when the config asks for it, moved to the
/// front of the store.
pub fn ensure<S>(store: &mut S, state: &SessionState, policy: &Policy) -> Result<Ensured, PipelineError>
where
    S: RecordStore + ?Sized,
{
    let mut existing: Vec<&Record> = store
        .all()
        .into_iter()
        .filter(|r| is_settings(r, policy))
        .collect();
    // Stable sort keeps the later record first among equal timestamps.
    existing.reverse();
    existing.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let ids: Vec<RecordId> = existing.iter().map(|r| r.id).collect();

    let (id, created) = match ids.split_first() {
        Some((&keep, duplicates)) => {
            for &duplicate in duplicates {
                store.remove(duplicate);
            }
            if !duplicates.is_empty() {
                warn!(removed = duplicates.len(), "removed duplicate settings records");
            }
            save_state(store, keep, state, policy)?;
            (keep, false)
        }
        None => (create(store, state, policy)?, true),
    };

    if state.config.pin_settings {
        store.move_to_front(id);
    }
    Ok(Ensured { id, created })
}

/// Rewrite the settings record from `state`.
pub fn save_state<S>(store: &mut S, id: RecordId, state: &SessionState, policy: &Policy) -> Result<(), PipelineError>
where
    S: RecordStore + ?Sized,
{
    let json = state.to_json()?;
    let record = store.get_mut(id)?;
    record.primary = render(&state.config, policy);
    record.secondary = json;
    debug!(title = %record.title, "saved session state");
    Ok(())
}

/// Load the state saved in the first settings record, if any parses.
pub fn restore_state<S>(store: &S, policy: &Policy) -> Option<Result<SessionState, PipelineError>>
where
    S: RecordStore + ?Sized,
{
    find_settings(store, policy).map(|record| SessionState::from_json(&record.secondary))
}

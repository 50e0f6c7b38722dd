//! Duplicate line removal for roster records.

use std::collections::HashSet;

use record_store::{Buffer, RecordStore};
use tracing::debug;

use crate::config::{Config, Policy};
use crate::error::PipelineError;
use crate::roster::roster_ids;

/// Drop repeated lines from `text`, comparing trimmed content.
///
/// The first occurrence of each non-blank line is kept as written. Blank
/// lines are always kept.
pub fn dedupe_lines(text: &str) -> String {
    let mut seen = HashSet::new();
    text.split('\n')
        .filter(|line| {
            let trimmed = line.trim();
            trimmed.is_empty() || seen.insert(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deduplicate both buffers of every roster record, each buffer on its own.
///
/// Returns the number of records that changed.
pub fn dedupe_rosters<S>(store: &mut S, config: &Config, policy: &Policy) -> Result<usize, PipelineError>
where
    S: RecordStore + ?Sized,
{
    let mut changed = 0;
    for id in roster_ids(store, config, policy) {
        let record = store.get_mut(id)?;
        let mut touched = false;
        for buffer in Buffer::ALL {
            let deduped = dedupe_lines(record.buffer(buffer));
            if deduped != record.buffer(buffer) {
                *record.buffer_mut(buffer) = deduped;
                touched = true;
            }
        }
        if touched {
            debug!(record = %record.title, "removed duplicate lines");
            changed += 1;
        }
    }
    Ok(changed)
}

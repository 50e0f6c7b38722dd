//! Session - owns the record store and persisted state, and exposes the host
//! hooks.
//!
//! Hooks never fail. An internal error is logged, both to `tracing` and to the
//! session log, and the hook returns its input unchanged.

mod state;

pub use state::*;

use record_store::{Record, RecordId, RecordStore};
use tracing::{debug, error, warn};

use crate::classify::{classify, Category};
use crate::commands::{extract_commands, help_text, status_text, Command};
use crate::config::{Config, Policy};
use crate::dedupe::dedupe_rosters;
use crate::error::PipelineError;
use crate::markers;
use crate::profile::{extract_name, ProfileDeriver};
use crate::roster::{is_roster, layout_of, RosterLayout, RosterLocator, RosterWriter, WriteOutcome};
use crate::settings;
use crate::sheet::BulkInitializer;

/// Host hook kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Input,
    Context,
    Output,
    /// Any other host call; cleans context text.
    Default,
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Hook::Input => "input",
            Hook::Context => "context",
            Hook::Output => "output",
            Hook::Default => "default",
        };
        write!(f, "{name}")
    }
}

/// One narrative session over a record store.
pub struct Session<S: RecordStore> {
    store: S,
    state: SessionState,
    policy: Policy,
    message: Option<String>,
}

impl<S: RecordStore> Session<S> {
    /// Start a session, restoring the state saved in the store's settings
    /// record when it is valid.
    pub fn load(store: S, policy: Policy) -> Self {
        let state = match settings::restore_state(&store, &policy) {
            Some(Ok(state)) => {
                debug!("restored session state from settings record");
                state
            }
            Some(Err(err)) => {
                warn!(error = %err, "could not parse saved session state, using defaults");
                let mut state = SessionState::default();
                state.log_debug("Could not parse saved state from settings record");
                state
            }
            None => SessionState::default(),
        };
        Self::with_state(store, state, policy)
    }

    /// Start a session with default policy.
    pub fn new(store: S) -> Self {
        Self::load(store, Policy::default())
    }

    pub fn with_state(store: S, state: SessionState, policy: Policy) -> Self {
        Self {
            store,
            state,
            policy,
            message: None,
        }
    }

    // Hooks

    /// Dispatch a host call. Input and output hooks pass `continue_prior`
    /// through untouched.
    pub fn handle(&mut self, hook: Hook, text: &str, continue_prior: bool) -> (String, bool) {
        match hook {
            Hook::Input => (self.on_input(text), continue_prior),
            Hook::Context => self.on_context(text, continue_prior),
            Hook::Output => (self.on_output(text), continue_prior),
            Hook::Default => self.on_default(text, continue_prior),
        }
    }

    /// Run operator commands found in `text` and return the text without them.
    ///
    /// Commands run even while disabled, so `enable` can take effect.
    pub fn on_input(&mut self, text: &str) -> String {
        let (commands, remaining) = extract_commands(text, &self.policy.command_prefix);
        for command in commands {
            self.execute(command);
        }
        remaining
    }

    /// Bootstrap the session: settings record, one-time sheet initialization,
    /// state save. The text is returned unchanged.
    pub fn on_context(&mut self, text: &str, continue_prior: bool) -> (String, bool) {
        let result = self.process_context();
        self.recover(Hook::Context, result, ());
        (text.to_string(), continue_prior)
    }

    /// File new annotations from `text` and return it with markers stripped.
    pub fn on_output(&mut self, text: &str) -> String {
        let result = self.process_output(text);
        self.recover(Hook::Output, result, text.to_string())
    }

    /// Clean context text: spans removed, whitespace collapsed.
    pub fn on_default(&mut self, text: &str, continue_prior: bool) -> (String, bool) {
        (markers::clean_context(text), continue_prior)
    }

    fn recover<T>(&mut self, hook: Hook, result: Result<T, PipelineError>, fallback: T) -> T {
        match result {
            Ok(value) => value,
            Err(err) => {
                error!(hook = %hook, error = %err, "hook failed, returning input unchanged");
                self.state
                    .logs
                    .error(format!("annotation pipeline error in {hook} hook"), &err);
                fallback
            }
        }
    }

    fn process_context(&mut self) -> Result<(), PipelineError> {
        if !self.state.config.enabled {
            if settings::find_settings(&self.store, &self.policy).is_none() {
                settings::create(&mut self.store, &self.state, &self.policy)?;
                self.state.log_debug("Created settings record");
            }
            return Ok(());
        }

        let ensured = settings::ensure(&mut self.store, &self.state, &self.policy)?;
        if ensured.created {
            self.state.log_debug("Created settings record");
            self.message = Some("Annotations initialized! Settings record created.".to_string());
        }

        let initializer = BulkInitializer::new(&self.state.config, &self.policy);
        let init = initializer.run(
            &mut self.store,
            &mut self.state.created_profiles,
            &mut self.state.initialized_from_sheet,
        )?;
        if let Some(init) = init {
            self.state.log_debug(format!(
                "Initialized {} servants from sheet: {}",
                init.names.len(),
                init.names.join(", ")
            ));
        }

        settings::save_state(&mut self.store, ensured.id, &self.state, &self.policy)
    }

    fn process_output(&mut self, text: &str) -> Result<String, PipelineError> {
        if !self.state.config.enabled {
            return Ok(text.to_string());
        }

        if self.state.config.auto_detect {
            let annotations = markers::extract_new(text, &mut self.state.processed_markers);
            if !annotations.is_empty() {
                self.state
                    .log_debug(format!("Found {} new annotations", annotations.len()));
                for annotation in &annotations {
                    self.file_annotation(annotation)?;
                }
                if self.state.config.remove_duplicates {
                    dedupe_rosters(&mut self.store, &self.state.config, &self.policy)?;
                }
            }
        }

        Ok(markers::strip(text))
    }

    /// Classify, locate, write, and derive a profile for one annotation.
    fn file_annotation(&mut self, annotation: &str) -> Result<WriteOutcome, PipelineError> {
        let category = classify(annotation);
        let outcome = self.write_to_roster(category.as_str(), annotation)?;

        if self.state.config.auto_profiles && category.is_person() {
            let deriver = ProfileDeriver::new(&self.state.config);
            deriver.derive_from_annotation(&mut self.store, &mut self.state.created_profiles, annotation)?;
        }
        Ok(outcome)
    }

    /// Write `info` to a roster record for `category`. Templated rosters take
    /// the name found in `info`, or all of it when none is found.
    fn write_to_roster(&mut self, category: &str, info: &str) -> Result<WriteOutcome, PipelineError> {
        let config = &self.state.config;
        let locator = RosterLocator::new(config, &self.policy);
        let writer = RosterWriter::new(config, &self.policy);

        let id = locator.locate(&mut self.store, category)?;
        let value = match layout_of(self.store.get(id)?) {
            RosterLayout::Templated { .. } => extract_name(info).unwrap_or_else(|| info.to_string()),
            RosterLayout::Bulleted => info.to_string(),
        };
        let outcome = writer.write(&mut self.store, id, &value)?;

        let title = self.store.get(outcome.record)?.title.clone();
        self.state
            .log_debug(format!("Added info to record \"{title}\" ({category}): {info}"));
        Ok(outcome)
    }

    fn execute(&mut self, command: Command) {
        debug!(command = command.as_str(), "executing operator command");
        let message = match command {
            Command::Enable => {
                self.enable();
                "Annotations enabled!".to_string()
            }
            Command::Disable => {
                self.disable();
                "Annotations disabled!".to_string()
            }
            Command::Reset => {
                self.reset();
                "Annotations reset to defaults!".to_string()
            }
            Command::Debug => {
                let enabled = !self.state.config.debug;
                self.set_debug(enabled);
                format!("Debug mode {}!", if enabled { "enabled" } else { "disabled" })
            }
            Command::Status => status_text(&self.state),
            Command::Help => help_text(&self.state.config, &self.policy),
        };
        self.message = Some(message);
    }

    // API

    pub fn enable(&mut self) {
        self.state.config.enabled = true;
    }

    pub fn disable(&mut self) {
        self.state.config.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.state.config.enabled
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.state.config = config;
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.state.config.debug = enabled;
    }

    /// All roster records in store order.
    pub fn roster_records(&self) -> Vec<&Record> {
        self.store
            .all()
            .into_iter()
            .filter(|r| is_roster(r, &self.state.config, &self.policy))
            .collect()
    }

    /// All profile records in store order.
    pub fn profile_records(&self) -> Vec<&Record> {
        self.store
            .all()
            .into_iter()
            .filter(|r| r.type_tag == self.state.config.profile_type)
            .collect()
    }

    /// Find or allocate a writable roster record for `category`.
    pub fn roster_for(&mut self, category: &str) -> Result<RecordId, PipelineError> {
        RosterLocator::new(&self.state.config, &self.policy).locate(&mut self.store, category)
    }

    /// File `info` under `category` directly, bypassing markers and
    /// classification.
    pub fn add_info(&mut self, category: &str, info: &str) -> Result<WriteOutcome, PipelineError> {
        self.write_to_roster(category, info)
    }

    /// File an annotation as if it had appeared in output text.
    pub fn add_annotation(&mut self, annotation: &str) -> Result<Category, PipelineError> {
        self.file_annotation(annotation)?;
        Ok(classify(annotation))
    }

    pub fn create_profile(&mut self, name: &str, info: &str) -> RecordId {
        ProfileDeriver::new(&self.state.config).create_profile(&mut self.store, name, info)
    }

    pub fn profile(&self, name: &str) -> Option<&Record> {
        ProfileDeriver::new(&self.state.config).find_profile(&self.store, name)
    }

    pub fn profile_names(&self) -> Vec<String> {
        ProfileDeriver::new(&self.state.config).profile_names(&self.store)
    }

    /// Deduplicate all roster records now. Returns how many changed.
    pub fn remove_duplicates(&mut self) -> Result<usize, PipelineError> {
        dedupe_rosters(&mut self.store, &self.state.config, &self.policy)
    }

    /// Restore default config and forget seen annotations, created profiles,
    /// the sheet flag, and the log.
    pub fn reset(&mut self) {
        self.state.reset();
        self.state.log_debug("Reset to defaults");
    }

    /// Write the current state to the settings record, if one exists.
    pub fn persist(&mut self) -> Result<(), PipelineError> {
        match settings::find_settings(&self.store, &self.policy).map(|r| r.id) {
            Some(id) => settings::save_state(&mut self.store, id, &self.state, &self.policy),
            None => Ok(()),
        }
    }

    pub fn logs(&self) -> Vec<String> {
        self.state.logs.entries().map(str::to_string).collect()
    }

    /// The last user-facing message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{parse_slots, Placement};
    use record_store::{MemoryRecordStore, StoreError};

    fn session() -> Session<MemoryRecordStore> {
        Session::new(MemoryRecordStore::new())
    }

    #[test]
    fn test_output_files_and_strips() {
        let mut session = session();
        let out = session.on_output("Tea is served. #-- The butler James serves tea --#");

        assert_eq!(out, "Tea is served. ");
        let rosters = session.roster_records();
        assert_eq!(rosters.len(), 1);
        assert_eq!(parse_slots(&rosters[0].primary)[0].value, "James");
        assert!(session.profile("James").is_some());
        assert!(session.state().processed_markers.contains("The butler James serves tea"));
    }

    #[test]
    fn test_output_disabled_returns_text_unchanged() {
        let mut session = session();
        session.disable();
        let text = "#-- The butler James --#";

        assert_eq!(session.on_output(text), text);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_auto_detect_off_strips_without_recording() {
        let mut session = session();
        session.set_config(Config {
            auto_detect: false,
            ..Config::default()
        });

        assert_eq!(session.on_output("a #-- A hidden room --#b"), "a b");
        assert!(session.store().is_empty());
        assert!(session.state().processed_markers.is_empty());
    }

    #[test]
    fn test_profiles_only_for_people() {
        let mut session = session();
        session.on_output("#-- The Red Room is locked --#");

        assert!(session.profile_names().is_empty());
        assert_eq!(session.roster_records()[0].title, "Locations List 1");
        assert!(session.roster_records()[0].primary.contains("• The Red Room is locked\n"));
    }

    #[test]
    fn test_input_commands() {
        let mut session = session();

        let text = session.on_input("Look around /annotate disable");
        assert_eq!(text, "Look around ");
        assert!(!session.is_enabled());
        assert_eq!(session.message(), Some("Annotations disabled!"));

        session.on_input("/annotate enable");
        assert!(session.is_enabled());

        session.on_input("/annotate debug");
        assert!(!session.config().debug);
        assert_eq!(session.take_message().as_deref(), Some("Debug mode disabled!"));
        assert_eq!(session.message(), None);

        session.on_input("/annotate status");
        assert!(session.message().unwrap().starts_with("Annotation Status:"));
    }

    #[test]
    fn test_reset_command_clears_state() {
        let mut session = session();
        session.on_output("#-- The maid Rosa --#");
        session.disable();

        session.on_input("/annotate reset");

        let state = session.state();
        assert!(state.config.enabled);
        assert!(state.processed_markers.is_empty());
        assert!(state.created_profiles.is_empty());
        assert_eq!(state.logs.len(), 1);
    }

    #[test]
    fn test_context_creates_settings_and_restores_on_load() {
        let mut session = session();
        session.set_debug(false);

        let (text, cont) = session.on_context("ctx", true);
        assert_eq!(text, "ctx");
        assert!(cont);
        assert_eq!(session.store().all()[0].title, "Annotation Settings");
        assert!(session.message().is_some());

        let store = session.into_store();
        let restored = Session::load(store, Policy::default());
        assert!(!restored.config().debug);
    }

    #[test]
    fn test_context_while_disabled_only_creates_missing_settings() {
        let mut session = session();
        session.disable();
        session.store_mut().add(Record::new("Sheet", "Character Sheet").with_primary("Subordinate(s): Anna"));

        session.on_context("", false);
        session.on_context("", false);

        let settings: Vec<_> = session
            .store()
            .all()
            .into_iter()
            .filter(|r| r.type_tag == "settings")
            .collect();
        assert_eq!(settings.len(), 1);
        assert!(!session.state().initialized_from_sheet);
    }

    #[test]
    fn test_load_with_corrupt_state_uses_defaults() {
        let mut store = MemoryRecordStore::new();
        store.add(Record::new("Annotation Settings", "settings").with_secondary("{\"config\": 7}"));

        let session = Session::load(store, Policy::default());
        assert_eq!(session.config(), &Config::default());
        assert_eq!(session.logs().len(), 1);
    }

    #[test]
    fn test_default_hook_cleans_context() {
        let mut session = session();
        let (text, cont) = session.handle(Hook::Default, " a  #-- note --#\n b ", true);
        assert_eq!(text, "a b");
        assert!(cont);
    }

    #[test]
    fn test_hook_error_is_logged_and_input_returned() {
        let mut session = session();
        let result: Result<String, PipelineError> = Err(StoreError::NotFound(RecordId::nil()).into());

        let text = session.recover(Hook::Output, result, "original".to_string());

        assert_eq!(text, "original");
        let logs = session.logs();
        assert!(logs[0].starts_with("ERROR: annotation pipeline error in output hook - record store error"));
    }

    #[test]
    fn test_add_info_and_api() {
        let mut session = session();

        let outcome = session.add_info("items", "A silver key").unwrap();
        assert_eq!(outcome.placement, Placement::Bullet(record_store::Buffer::Primary));
        assert_eq!(session.roster_for("items").unwrap(), outcome.record);

        let id = session.create_profile("Marco", "The gardener");
        assert_eq!(session.profile("Marco").unwrap().id, id);
        assert_eq!(session.profile_records().len(), 1);

        assert_eq!(session.add_annotation("A quest begins").unwrap(), Category::Events);
        assert_eq!(session.remove_duplicates().unwrap(), 0);
    }
}

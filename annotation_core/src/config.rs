//! Operator configuration and scenario policy.
//!
//! [`Config`] holds the operator flags that persist with the session state.
//! [`Policy`] holds the scenario defaults that stay fixed for a deployment and
//! can be loaded from TOML.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Operator flags persisted with the session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Master switch for all hooks.
    pub enabled: bool,

    /// Keep the settings record at the front of the store.
    #[serde(rename = "pinSettingsCard")]
    pub pin_settings: bool,

    /// Record annotations found in output text.
    pub auto_detect: bool,

    /// Maximum combined body length of a roster record, in characters.
    #[serde(rename = "cardLimit")]
    pub capacity_limit: usize,

    /// Derive profile records for people named in annotations.
    #[serde(rename = "autoCharacters")]
    pub auto_profiles: bool,

    /// Remove duplicate lines from roster records after each batch.
    pub remove_duplicates: bool,

    /// Append debug entries to the session log.
    #[serde(rename = "debugMode")]
    pub debug: bool,

    /// Type tag of roster records.
    #[serde(rename = "listCardType")]
    pub roster_type: String,

    /// Type tag of profile records.
    #[serde(rename = "characterCardType")]
    pub profile_type: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            pin_settings: true,
            auto_detect: true,
            capacity_limit: 2000,
            auto_profiles: true,
            remove_duplicates: true,
            debug: true,
            roster_type: "Lists".to_string(),
            profile_type: "character".to_string(),
        }
    }
}

/// A one-way category alias: a request for `category` also matches records
/// mentioning `also_matches`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAlias {
    pub category: String,
    pub also_matches: String,
}

impl CategoryAlias {
    pub fn new(category: impl Into<String>, also_matches: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            also_matches: also_matches.into(),
        }
    }
}

/// Scenario defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Number of slots in a freshly allocated templated roster record.
    pub slot_count: usize,

    /// Maximum number of names the bulk initializer files from a sheet.
    pub bulk_init_cap: usize,

    pub category_aliases: Vec<CategoryAlias>,

    /// Description given to profiles created by the bulk initializer.
    /// `{owner}` is replaced with the sheet's declared name.
    pub profile_description: String,

    /// Owner label used when the sheet's name field is missing or a placeholder.
    pub owner_fallback: String,

    /// Type tag that marks a record as a sheet.
    pub sheet_type: String,

    pub settings_title: String,
    pub settings_type: String,

    /// Leading word of operator commands in input text.
    pub command_prefix: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            slot_count: 10,
            bulk_init_cap: 10,
            category_aliases: vec![
                CategoryAlias::new("characters", "servant"),
                CategoryAlias::new("servants", "character"),
            ],
            profile_description: "Servant of {owner}".to_string(),
            owner_fallback: "the Master".to_string(),
            sheet_type: "Character Sheet".to_string(),
            settings_title: "Annotation Settings".to_string(),
            settings_type: "settings".to_string(),
            command_prefix: "/annotate".to_string(),
        }
    }
}

impl Policy {
    /// Parse a policy from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(source)?)
    }

    /// Extra terms a request for `category` also matches.
    pub fn aliases_for<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.category_aliases
            .iter()
            .filter(move |alias| alias.category.eq_ignore_ascii_case(category))
            .map(|alias| alias.also_matches.as_str())
    }

    /// Render the bulk-init profile description for `owner`.
    pub fn describe_owner(&self, owner: &str) -> String {
        self.profile_description.replace("{owner}", owner)
    }
}

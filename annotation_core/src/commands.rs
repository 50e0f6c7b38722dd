//! Operator commands embedded in input text, e.g. `/annotate disable`.

use crate::config::{Config, Policy};
use crate::session::SessionState;

/// An operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
    Reset,
    Help,
    /// Toggle debug mode.
    Debug,
    Status,
}

impl Command {
    pub const ALL: [Command; 6] = [
        Command::Enable,
        Command::Disable,
        Command::Reset,
        Command::Debug,
        Command::Status,
        Command::Help,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Enable => "enable",
            Command::Disable => "disable",
            Command::Reset => "reset",
            Command::Help => "help",
            Command::Debug => "debug",
            Command::Status => "status",
        }
    }

    /// Parse a command word, ignoring case.
    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(word))
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Command::Enable => "Enable annotation processing",
            Command::Disable => "Disable annotation processing",
            Command::Reset => "Reset to default settings",
            Command::Help => "Show this help",
            Command::Debug => "Toggle debug mode",
            Command::Status => "Show current status",
        }
    }
}

/// A command found in input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMatch {
    pub command: Command,
    /// Byte offset of the prefix.
    pub start: usize,
    /// Byte offset just past the command word.
    pub end: usize,
}

/// Find every `<prefix> <word>` command in `text`, ignoring case.
///
/// At least one whitespace character must separate the prefix from the word,
/// and the word must be a whole command word.
pub fn find_commands(text: &str, prefix: &str) -> Vec<CommandMatch> {
    if prefix.is_empty() {
        return Vec::new();
    }
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let prefix = prefix.to_ascii_lowercase();

    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = lower[cursor..].find(&prefix) {
        let start = cursor + offset;
        let after_prefix = start + prefix.len();
        cursor = after_prefix;

        let rest = &text[after_prefix..];
        let word_start = rest.len() - rest.trim_start().len();
        if word_start == 0 {
            continue;
        }
        let word = &rest[word_start..];
        let word_len = word
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(word.len());

        if let Some(command) = Command::from_word(&word[..word_len]) {
            let end = after_prefix + word_start + word_len;
            found.push(CommandMatch { command, start, end });
            cursor = end;
        }
    }
    found
}

/// Remove every command from `text`, returning the commands in order and the
/// remaining text.
pub fn extract_commands(text: &str, prefix: &str) -> (Vec<Command>, String) {
    let matches = find_commands(text, prefix);
    let mut remaining = String::with_capacity(text.len());
    let mut cursor = 0;
    for m in &matches {
        remaining.push_str(&text[cursor..m.start]);
        cursor = m.end;
    }
    remaining.push_str(&text[cursor..]);
    (matches.into_iter().map(|m| m.command).collect(), remaining)
}

/// One `• <prefix> <command> - <description>` line per command.
pub fn command_lines(prefix: &str) -> String {
    Command::ALL
        .iter()
        .map(|command| format!("• {prefix} {} - {}\n", command.as_str(), command.describe()))
        .collect()
}

pub fn help_text(config: &Config, policy: &Policy) -> String {
    format!(
        "Annotation Help:\n\n\
         Commands:\n{commands}\n\
         Usage:\n\
         Place information between #-- text --# markers in your story to file it into roster records.\n\n\
         Annotations are automatically:\n\
         • Filed into roster records by category\n\
         • Turned into profile records when they name a person\n\
         • Deduplicated\n\
         • Split across records of at most {limit} characters",
        commands = command_lines(&policy.command_prefix),
        limit = config.capacity_limit,
    )
}

pub fn status_text(state: &SessionState) -> String {
    format!(
        "Annotation Status: Enabled: {} Processed Markers: {} Created Profiles: {} Debug Mode: {}",
        state.config.enabled,
        state.processed_markers.len(),
        state.created_profiles.len(),
        state.config.debug,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_commands() {
        let text = "Hello /annotate disable and /ANNOTATE  Status.";
        let found = find_commands(text, "/annotate");

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].command, Command::Disable);
        assert_eq!(&text[found[0].start..found[0].end], "/annotate disable");
        assert_eq!(found[1].command, Command::Status);
        assert_eq!(&text[found[1].start..found[1].end], "/ANNOTATE  Status");
    }

    #[test]
    fn test_ignores_non_commands() {
        assert!(find_commands("/annotate", "/annotate").is_empty());
        assert!(find_commands("/annotatedisable", "/annotate").is_empty());
        assert!(find_commands("/annotate dance", "/annotate").is_empty());
        assert!(find_commands("/annotate enabled", "/annotate").is_empty());
        assert!(find_commands("anything", "").is_empty());
    }

    #[test]
    fn test_extract_commands() {
        let (commands, text) = extract_commands("Go north. /annotate debug /annotate help", "/annotate");
        assert_eq!(commands, vec![Command::Debug, Command::Help]);
        assert_eq!(text, "Go north.  ");

        let (commands, text) = extract_commands("Nothing here", "/annotate");
        assert!(commands.is_empty());
        assert_eq!(text, "Nothing here");
    }

    #[test]
    fn test_from_word() {
        assert_eq!(Command::from_word("RESET"), Some(Command::Reset));
        assert_eq!(Command::from_word("restart"), None);
    }

    #[test]
    fn test_help_and_status_text() {
        let config = Config::default();
        let policy = Policy::default();

        let help = help_text(&config, &policy);
        assert!(help.contains("• /annotate enable - Enable annotation processing"));
        assert!(help.contains("2000 characters"));

        let mut state = SessionState::default();
        state.processed_markers.insert("x".to_string());
        assert_eq!(
            status_text(&state),
            "Annotation Status: Enabled: true Processed Markers: 1 Created Profiles: 0 Debug Mode: true"
        );
    }
}

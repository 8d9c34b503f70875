use super::types::{
    FragmentKind, IGNORED_COMMANDS_SET, INCLUDE_MARKER, LINE_COMMENT, PROMPT_KEYWORD,
};

/// First whitespace-delimited word of a line, if there is one.
pub fn first_word(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// Classify one line of a script (without its terminator).
///
/// Rules are tried in order and the first match wins:
/// `prompt…` (case-sensitive prefix) is PROMPT, `@…` is INCLUDE, a word from
/// the ignored command set (case-insensitive), a `--` comment or a blank line
/// is IGNORE, and everything else is SQL.
pub fn classify_line(line: &str) -> FragmentKind {
    let Some(word) = first_word(line) else {
        return FragmentKind::Ignore;
    };

    if word.starts_with(PROMPT_KEYWORD) {
        FragmentKind::Prompt
    } else if word.starts_with(INCLUDE_MARKER) {
        FragmentKind::Include
    } else if is_ignored_command(word) {
        FragmentKind::Ignore
    } else {
        FragmentKind::Sql
    }
}

fn is_ignored_command(word: &str) -> bool {
    word.starts_with(LINE_COMMENT) || IGNORED_COMMANDS_SET.contains(word.to_lowercase().as_str())
}

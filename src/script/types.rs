use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// SQL*Plus commands that are recognised but never passed to the SQL executor.
pub const IGNORED_COMMANDS: &[&str] = &[
    "set",
    "def",
    "var",
    "accept",
    "connect",
    "spool",
    "pause",
    "exit",
    "sqlplus",
    "help",
    "host",
    "show",
    "startup",
    "describe",
    "edit",
    "get",
    "save",
    "list",
    "del",
    "input",
    "append",
    "change",
    "run",
    "execute",
    "disconnect",
    "shutdown",
    "--",
];

pub(crate) static IGNORED_COMMANDS_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| IGNORED_COMMANDS.iter().copied().collect());

pub const PROMPT_KEYWORD: &str = "prompt";
pub const INCLUDE_MARKER: char = '@';
pub const LINE_COMMENT: &str = "--";

/// What a line (or run of lines) of a SQL*Plus script asks the runner to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Prompt,
    Include,
    Ignore,
    Sql,
}

impl FragmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            FragmentKind::Prompt => "PROMPT",
            FragmentKind::Include => "INCLUDE",
            FragmentKind::Ignore => "IGNORE",
            FragmentKind::Sql => "SQL",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified chunk of a script file.
///
/// Directive fragments hold exactly one source line. SQL fragments hold the
/// newline-joined run of consecutive SQL lines, and `first_line` is the
/// 1-based line of the first of them within the file being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    pub first_line: usize,
    pub base_dir: PathBuf,
}

impl Fragment {
    pub fn new(kind: FragmentKind, line: &str, first_line: usize, base_dir: PathBuf) -> Self {
        Self {
            kind,
            text: line.to_string(),
            first_line,
            base_dir,
        }
    }

    pub(crate) fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Message carried by a PROMPT line: the trimmed text with the literal
    /// `prompt` prefix cut off, trimmed again.
    pub fn prompt_message(&self) -> &str {
        let trimmed = self.text.trim();
        trimmed
            .strip_prefix(PROMPT_KEYWORD)
            .unwrap_or(trimmed)
            .trim()
    }

    /// Path carried by an INCLUDE line, exactly as written after the `@`.
    pub fn include_path(&self) -> &str {
        let trimmed = self.text.trim();
        trimmed.strip_prefix(INCLUDE_MARKER).unwrap_or(trimmed)
    }

    /// Target of an INCLUDE line, resolved against the directory of the
    /// file that contained it.
    pub fn include_target(&self) -> PathBuf {
        self.base_dir.join(self.include_path())
    }
}

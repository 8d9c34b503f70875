use std::path::{Path, PathBuf};

use tracing::debug;

use super::classify::classify_line;
use super::types::{Fragment, FragmentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Idle,
    BufferingSql,
}

/// Turns the lines of one file into its ordered fragment sequence.
///
/// A SQL fragment is pushed as soon as its first line is seen; later SQL
/// lines are appended to that same fragment, so nothing has to be flushed
/// when the input ends.
struct FragmentBuilder {
    state: BuildState,
    base_dir: PathBuf,
    fragments: Vec<Fragment>,
}

impl FragmentBuilder {
    fn new(base_dir: &Path) -> Self {
        Self {
            state: BuildState::Idle,
            base_dir: base_dir.to_path_buf(),
            fragments: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str, line_number: usize) {
        let kind = classify_line(line);

        match (kind, self.state) {
            (FragmentKind::Sql, BuildState::BufferingSql) => {
                if let Some(current) = self.fragments.last_mut() {
                    current.push_line(line);
                }
            }
            (FragmentKind::Sql, BuildState::Idle) => {
                self.push(kind, line, line_number);
                self.state = BuildState::BufferingSql;
            }
            _ => {
                self.push(kind, line, line_number);
                self.state = BuildState::Idle;
            }
        }
    }

    fn push(&mut self, kind: FragmentKind, line: &str, line_number: usize) {
        self.fragments
            .push(Fragment::new(kind, line, line_number, self.base_dir.clone()));
    }

    fn finish(self) -> Vec<Fragment> {
        self.fragments
    }
}

/// Parse a whole script into fragments. Line numbers start at 1 and LF or
/// CRLF terminators are both accepted; a missing final terminator is fine.
pub fn parse_script(source: &str, base_dir: &Path) -> Vec<Fragment> {
    let mut builder = FragmentBuilder::new(base_dir);
    for (index, line) in source.lines().enumerate() {
        builder.process_line(line, index + 1);
    }
    let fragments = builder.finish();

    debug!(
        base_dir = %base_dir.display(),
        fragments = fragments.len(),
        sql_batches = fragments
            .iter()
            .filter(|fragment| fragment.kind == FragmentKind::Sql)
            .count(),
        "parsed script"
    );

    fragments
}

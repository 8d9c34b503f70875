use std::env;
use std::path::{self, Path, PathBuf};
use std::vec;

use encoding_rs::Encoding;
use tracing::{debug, trace};

use super::collaborators::{Prompter, SqlExecutor};
use super::error::{Result, ScriptError};
use super::parser::parse_script;
use super::source::{ScriptFile, DEFAULT_ENCODING};
use super::types::{Fragment, FragmentKind};

/// Prefix of the debug message sent to the prompter before each SQL batch.
pub const EXECUTING_SCRIPT_PREFIX: &str = "Executing script:\n";

/// A rudimentary SQL*Plus runner.
///
/// `prompt` lines are sent to the prompter, `@file` lines run another script
/// inline, the commands in [`IGNORED_COMMANDS`](super::IGNORED_COMMANDS) are
/// skipped and every other run of lines goes to the SQL executor as one
/// batch. Supported commands must fit on a single line.
pub struct SqlPlusScriptRunner<E, P> {
    executor: E,
    prompter: P,
    max_include_depth: Option<usize>,
}

/// One open script: the fragments it has left to run.
struct ScriptFrame {
    fragments: vec::IntoIter<Fragment>,
    origin: Option<PathBuf>,
}

impl ScriptFrame {
    fn new(fragments: Vec<Fragment>, origin: Option<PathBuf>) -> Self {
        Self {
            fragments: fragments.into_iter(),
            origin,
        }
    }

    fn origin_display(&self) -> String {
        self.origin
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<string>".to_string())
    }
}

impl<E: SqlExecutor, P: Prompter> SqlPlusScriptRunner<E, P> {
    pub fn new(executor: E, prompter: P) -> Self {
        Self {
            executor,
            prompter,
            max_include_depth: None,
        }
    }

    /// Refuse includes nested deeper than `depth` levels. Without a limit an
    /// include cycle runs until memory is exhausted.
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = Some(depth);
        self
    }

    pub fn max_include_depth(&self) -> Option<usize> {
        self.max_include_depth
    }

    /// Run a script held in memory. Includes resolve against the current
    /// working directory and are read with the default encoding.
    pub fn run_script(&mut self, script_source: &str) -> Result<()> {
        let base_dir = env::current_dir().map_err(|source| ScriptError::SourceIo {
            path: PathBuf::from("."),
            source,
        })?;
        let fragments = parse_script(script_source, &base_dir);
        self.run_fragments(fragments, None, DEFAULT_ENCODING)
    }

    /// Run the script in `path`, read with the default encoding.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.run_file_with_encoding(path, DEFAULT_ENCODING)
    }

    /// Run the script in `path`. Includes reached from it are read with the
    /// same encoding.
    pub fn run_file_with_encoding(
        &mut self,
        path: impl AsRef<Path>,
        encoding: &'static Encoding,
    ) -> Result<()> {
        let file = ScriptFile::load(path.as_ref(), encoding)?;
        let fragments = parse_script(&file.text, &file.base_dir);
        self.run_fragments(fragments, Some(file.path), encoding)
    }

    fn run_fragments(
        &mut self,
        fragments: Vec<Fragment>,
        origin: Option<PathBuf>,
        encoding: &'static Encoding,
    ) -> Result<()> {
        let mut frames = vec![ScriptFrame::new(fragments, origin)];

        while let Some(frame) = frames.last_mut() {
            let Some(fragment) = frame.fragments.next() else {
                if let Some(finished) = frames.pop() {
                    debug!(script = %finished.origin_display(), "finished script");
                }
                continue;
            };

            let depth = frames.len();
            if let Some(included) = self.execute_fragment(fragment, depth, encoding)? {
                frames.push(included);
            }
        }

        Ok(())
    }

    /// Run one fragment. An include hands back the frame of the included
    /// script, which must be run to completion before the next fragment.
    fn execute_fragment(
        &mut self,
        fragment: Fragment,
        depth: usize,
        encoding: &'static Encoding,
    ) -> Result<Option<ScriptFrame>> {
        trace!(
            kind = %fragment.kind,
            line = fragment.first_line,
            "dispatching fragment"
        );

        match fragment.kind {
            FragmentKind::Prompt => {
                self.prompter
                    .info(fragment.prompt_message())
                    .map_err(ScriptError::Prompter)?;
                Ok(None)
            }
            FragmentKind::Include => self.open_include(&fragment, depth, encoding).map(Some),
            FragmentKind::Ignore => Ok(None),
            FragmentKind::Sql => {
                let message = format!("{}{}", EXECUTING_SCRIPT_PREFIX, fragment.text);
                self.prompter
                    .debug(&message)
                    .map_err(ScriptError::Prompter)?;
                self.executor
                    .execute(&fragment.text, fragment.first_line)
                    .map_err(ScriptError::Executor)?;
                Ok(None)
            }
        }
    }

    fn open_include(
        &self,
        fragment: &Fragment,
        depth: usize,
        encoding: &'static Encoding,
    ) -> Result<ScriptFrame> {
        let target = fragment.include_target();
        if !target.is_file() {
            return Err(ScriptError::IncludeNotFound(absolute_path(&target)));
        }
        if let Some(limit) = self.max_include_depth {
            if depth > limit {
                return Err(ScriptError::IncludeDepthExceeded {
                    path: absolute_path(&target),
                    limit,
                });
            }
        }

        let file = ScriptFile::load(&target, encoding).map_err(ScriptError::into_include_error)?;
        debug!(
            script = %file.path.display(),
            line = fragment.first_line,
            depth,
            "entering included script"
        );
        let fragments = parse_script(&file.text, &file.base_dir);
        Ok(ScriptFrame::new(fragments, Some(file.path)))
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn into_parts(self) -> (E, P) {
        (self.executor, self.prompter)
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

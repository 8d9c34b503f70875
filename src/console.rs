use std::io::{self, Write};

use chrono::Local;
use tracing::debug;

use crate::script::{BoxError, Prompter};

/// Prints `prompt` messages to stdout. Debug messages go to the log.
pub struct ConsolePrompter<W = io::Stdout> {
    out: W,
    timestamps: bool,
}

impl ConsolePrompter {
    pub fn stdout(timestamps: bool) -> Self {
        Self::new(io::stdout(), timestamps)
    }
}

impl<W: Write> ConsolePrompter<W> {
    pub fn new(out: W, timestamps: bool) -> Self {
        Self { out, timestamps }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Prompter for ConsolePrompter<W> {
    fn info(&mut self, message: &str) -> Result<(), BoxError> {
        if self.timestamps {
            let now = Local::now().format("%H:%M:%S");
            writeln!(self.out, "[{}] {}", now, message)?;
        } else {
            writeln!(self.out, "{}", message)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn debug(&mut self, message: &str) -> Result<(), BoxError> {
        debug!("{}", message);
        Ok(())
    }
}

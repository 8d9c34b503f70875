/// Error type returned by collaborators; the runner passes it through untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Runs a batch of raw SQL lines against a database.
pub trait SqlExecutor {
    /// `script_source` is the newline-joined run of SQL lines and
    /// `line_offset` the 1-based line of its first line in the originating
    /// file, for error reporting.
    fn execute(&mut self, script_source: &str, line_offset: usize) -> Result<(), BoxError>;
}

/// Receives the messages a script produces while it runs.
pub trait Prompter {
    fn info(&mut self, message: &str) -> Result<(), BoxError>;

    fn debug(&mut self, message: &str) -> Result<(), BoxError>;
}

impl<T: SqlExecutor + ?Sized> SqlExecutor for &mut T {
    fn execute(&mut self, script_source: &str, line_offset: usize) -> Result<(), BoxError> {
        (**self).execute(script_source, line_offset)
    }
}

impl<T: Prompter + ?Sized> Prompter for &mut T {
    fn info(&mut self, message: &str) -> Result<(), BoxError> {
        (**self).info(message)
    }

    fn debug(&mut self, message: &str) -> Result<(), BoxError> {
        (**self).debug(message)
    }
}

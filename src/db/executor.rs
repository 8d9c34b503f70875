use oracle::{Connection, Error as OracleError};
use thiserror::Error;
use tracing::{debug, info};

use crate::script::{BoxError, SqlExecutor};

use super::statement::split_batch;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: OracleError,
    },

    #[error("Script execution failed on line {line}: {source}")]
    Statement {
        line: usize,
        #[source]
        source: OracleError,
    },

    #[error("Script execution failed while committing: {0}")]
    Commit(#[source] OracleError),

    #[error("session statement failed ({statement}): {source}")]
    Session {
        statement: String,
        #[source]
        source: OracleError,
    },
}

/// Runs SQL batches statement by statement on an Oracle connection.
pub struct OracleSqlExecutor {
    conn: Connection,
    commit_after_batch: bool,
}

impl OracleSqlExecutor {
    pub fn new(conn: Connection, commit_after_batch: bool) -> Self {
        Self {
            conn,
            commit_after_batch,
        }
    }

    /// Run each statement once, before the script, in the order given.
    pub fn apply_session_statements(&self, statements: &[String]) -> Result<(), DbError> {
        for statement in statements {
            debug!(%statement, "applying session statement");
            self.conn
                .execute(statement, &[])
                .map_err(|source| DbError::Session {
                    statement: statement.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn run_batch(&self, script_source: &str, line_offset: usize) -> Result<(), DbError> {
        let statements = split_batch(script_source);
        debug!(
            line = line_offset,
            statements = statements.len(),
            "running SQL batch"
        );

        for statement in statements {
            let line = statement.source_line(line_offset);
            let stmt = self
                .conn
                .execute(&statement.text, &[])
                .map_err(|source| DbError::Statement { line, source })?;
            if stmt.is_dml() {
                let affected = stmt.row_count().unwrap_or(0);
                info!(line, "{} row(s) affected", affected);
            }
        }

        if self.commit_after_batch {
            self.conn.commit().map_err(DbError::Commit)?;
        }
        Ok(())
    }
}

impl SqlExecutor for OracleSqlExecutor {
    fn execute(&mut self, script_source: &str, line_offset: usize) -> Result<(), BoxError> {
        self.run_batch(script_source, line_offset)
            .map_err(|err| Box::new(err) as BoxError)
    }
}

/// Logs each batch instead of running it; used for dry runs.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    pub batches: usize,
    pub statements: usize,
    /// Script line of every statement seen, in order.
    pub statement_lines: Vec<usize>,
}

impl SqlExecutor for DryRunExecutor {
    fn execute(&mut self, script_source: &str, line_offset: usize) -> Result<(), BoxError> {
        let statements = split_batch(script_source);
        for statement in &statements {
            let line = statement.source_line(line_offset);
            info!(line, "would execute: {}", statement.text);
            self.statement_lines.push(line);
        }
        self.batches += 1;
        self.statements += statements.len();
        Ok(())
    }
}

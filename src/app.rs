use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use encoding_rs::Encoding;
use tracing::info;

use sqlplus_runner::db::{DbError, DryRunExecutor, OracleSqlExecutor};
use sqlplus_runner::script::encoding_for_label;
use sqlplus_runner::utils::{credential_store, AppConfig};
use sqlplus_runner::{ConsolePrompter, SqlExecutor, SqlPlusScriptRunner};

/// Run a SQL*Plus script against an Oracle database.
#[derive(Debug, Parser)]
#[command(name = "sqlplus_runner", version)]
pub struct Cli {
    /// Script to run
    pub script: PathBuf,

    /// Encoding of the script and everything it includes (e.g. utf-8, windows-1252)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Database user
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Database host
    #[arg(long)]
    pub host: Option<String>,

    /// Listener port
    #[arg(long)]
    pub port: Option<u16>,

    /// Service name
    #[arg(long)]
    pub service: Option<String>,

    /// Password; looked up in the OS keyring when omitted
    #[arg(long, env = "SQLPLUS_RUNNER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Maximum nesting of @file includes (0 disables includes)
    #[arg(long)]
    pub max_include_depth: Option<usize>,

    /// Save the connection to the config file and the password to the keyring
    #[arg(long)]
    pub remember: bool,

    /// Log the SQL that would run instead of connecting
    #[arg(long)]
    pub dry_run: bool,

    /// Prefix prompt output with the time of day
    #[arg(long)]
    pub timestamps: bool,
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&mut self, cli: &Cli) -> Result<(), Box<dyn Error>> {
        self.apply_overrides(cli);
        let encoding = encoding_for_label(&self.config.encoding)?;

        if cli.dry_run {
            let executor = self.run_with(DryRunExecutor::default(), &cli.script, encoding)?;
            info!(
                batches = executor.batches,
                statements = executor.statements,
                "dry run finished"
            );
        } else {
            let executor = self.connect(cli)?;
            self.run_with(executor, &cli.script, encoding)?;
            info!(script = %cli.script.display(), "script finished");
        }
        Ok(())
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        let connection = &mut self.config.connection;
        if let Some(user) = &cli.user {
            connection.username = user.clone();
        }
        if let Some(host) = &cli.host {
            connection.host = host.clone();
        }
        if let Some(port) = cli.port {
            connection.port = port;
        }
        if let Some(service) = &cli.service {
            connection.service_name = service.clone();
        }
        if let Some(encoding) = &cli.encoding {
            self.config.encoding = encoding.clone();
        }
        if cli.max_include_depth.is_some() {
            self.config.max_include_depth = cli.max_include_depth;
        }
        self.config.timestamps |= cli.timestamps;
    }

    fn run_with<E: SqlExecutor>(
        &self,
        executor: E,
        script: &Path,
        encoding: &'static Encoding,
    ) -> Result<E, Box<dyn Error>> {
        let prompter = ConsolePrompter::stdout(self.config.timestamps);
        let mut runner = SqlPlusScriptRunner::new(executor, prompter);
        if let Some(depth) = self.config.max_include_depth {
            runner = runner.with_max_include_depth(depth);
        }

        info!(
            script = %script.display(),
            encoding = encoding.name(),
            max_include_depth = ?runner.max_include_depth(),
            "running script"
        );
        runner.run_file_with_encoding(script, encoding)?;

        let (executor, _) = runner.into_parts();
        Ok(executor)
    }

    fn connect(&self, cli: &Cli) -> Result<OracleSqlExecutor, Box<dyn Error>> {
        let mut info = self.config.connection.clone();
        let key = info.display_string();
        info.password = match &cli.password {
            Some(password) => password.clone(),
            None => credential_store::get_password(&key)?.unwrap_or_default(),
        };

        if cli.remember {
            if let Some(password) = password_to_remember(cli) {
                credential_store::store_password(&key, password)?;
            }
            self.config.save()?;
            info!(connection = %key, "connection saved");
        }

        let conn = info.connect().map_err(|source| DbError::Connect {
            target: key.clone(),
            source,
        })?;
        let executor = OracleSqlExecutor::new(conn, self.config.commit_after_batch);
        executor.apply_session_statements(&self.config.session_statements)?;
        Ok(executor)
    }
}

/// The password `--remember` may write to the keyring: only one given on the
/// command line or in the environment, never a blank fallback.
fn password_to_remember(cli: &Cli) -> Option<&str> {
    cli.password
        .as_deref()
        .filter(|password| !password.is_empty())
}

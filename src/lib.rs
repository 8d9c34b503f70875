pub mod console;
pub mod db;
pub mod script;
pub mod utils;

pub use console::ConsolePrompter;
pub use script::{
    parse_script, Fragment, FragmentKind, Prompter, ScriptError, SqlExecutor, SqlPlusScriptRunner,
};

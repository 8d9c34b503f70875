#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sqlplus_runner::script::BoxError;
use sqlplus_runner::{Prompter, SqlExecutor, SqlPlusScriptRunner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Info(String),
    Debug(String),
    Execute(String, usize),
}

pub fn info(message: &str) -> Call {
    Call::Info(message.to_string())
}

/// The debug message and executor call every SQL batch produces.
pub fn batch(text: &str, line: usize) -> [Call; 2] {
    [
        Call::Debug(format!("Executing script:\n{}", text)),
        Call::Execute(text.to_string(), line),
    ]
}

/// Executor and prompter stub writing to one shared, ordered call log.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<Call>>>,
    fail_on: Option<String>,
}

impl CallLog {
    pub fn failing_on(fragment: &str) -> Self {
        Self {
            fail_on: Some(fragment.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn runner(&self) -> SqlPlusScriptRunner<CallLog, CallLog> {
        SqlPlusScriptRunner::new(self.clone(), self.clone())
    }
}

impl SqlExecutor for CallLog {
    fn execute(&mut self, script_source: &str, line_offset: usize) -> Result<(), BoxError> {
        if let Some(fragment) = &self.fail_on {
            if script_source.contains(fragment.as_str()) {
                return Err(format!("Script execution failed on line {}", line_offset).into());
            }
        }
        self.calls
            .borrow_mut()
            .push(Call::Execute(script_source.to_string(), line_offset));
        Ok(())
    }
}

impl Prompter for CallLog {
    fn info(&mut self, message: &str) -> Result<(), BoxError> {
        self.calls.borrow_mut().push(Call::Info(message.to_string()));
        Ok(())
    }

    fn debug(&mut self, message: &str) -> Result<(), BoxError> {
        self.calls.borrow_mut().push(Call::Debug(message.to_string()));
        Ok(())
    }
}

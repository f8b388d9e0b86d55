//! In-memory connection that records every call instead of talking to a server.

#![allow(dead_code)]

use relq::executor::{ExecError, Executor, TransactionalConnection};
use relq::transaction::IsolationLevel;
use sea_query::{Value, Values};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Begin(IsolationLevel),
    Execute(String, Vec<Value>),
    Query(String, Vec<Value>),
    Commit,
    Rollback,
}

#[derive(Default)]
pub struct RecordingConnection {
    events: RefCell<Vec<Event>>,
    pub fail_begin: Cell<bool>,
    pub fail_commit: Cell<bool>,
    pub fail_rollback: Cell<bool>,
    pub fail_statements: Cell<bool>,
    pub rows: Cell<usize>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.borrow().iter().filter(|e| *e == wanted).count()
    }

    pub fn commits(&self) -> usize {
        self.count(&Event::Commit)
    }

    pub fn rollbacks(&self) -> usize {
        self.count(&Event::Rollback)
    }

    fn push(&self, event: Event, fail: bool) -> Result<(), ExecError> {
        let label = format!("{event:?}");
        self.events.borrow_mut().push(event);
        if fail {
            Err(ExecError::Other(format!("refused: {label}")))
        } else {
            Ok(())
        }
    }
}

impl Executor for RecordingConnection {
    type Row = ();

    fn execute(&self, sql: &str, values: &Values) -> Result<u64, ExecError> {
        self.push(
            Event::Execute(sql.to_string(), values.0.clone()),
            self.fail_statements.get(),
        )?;
        Ok(self.rows.get() as u64)
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<()>, ExecError> {
        self.push(
            Event::Query(sql.to_string(), values.0.clone()),
            self.fail_statements.get(),
        )?;
        Ok(vec![(); self.rows.get()])
    }
}

impl TransactionalConnection for RecordingConnection {
    fn begin(&self, isolation: IsolationLevel) -> Result<(), ExecError> {
        self.push(Event::Begin(isolation), self.fail_begin.get())
    }

    fn commit(&self) -> Result<(), ExecError> {
        self.push(Event::Commit, self.fail_commit.get())
    }

    fn rollback(&self) -> Result<(), ExecError> {
        self.push(Event::Rollback, self.fail_rollback.get())
    }
}

/// Custom error type used as the unit of work's error in tests
#[derive(Debug, PartialEq)]
pub struct WorkError(pub &'static str);

impl std::fmt::Display for WorkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "work error: {}", self.0)
    }
}

impl std::error::Error for WorkError {}

impl From<ExecError> for WorkError {
    fn from(_: ExecError) -> Self {
        WorkError("statement failed")
    }
}

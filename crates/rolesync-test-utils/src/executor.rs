//! [`RecordingExecutor`] collects executed operations.

use std::cell::RefCell;

use rolesync_core::{BoxError, ChangeOperation, Executor};

/// An executor that records operations instead of running them.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    executed: RefCell<Vec<ChangeOperation>>,
    fail_on: Option<String>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first statement containing `needle`
    pub fn failing_on(needle: &str) -> Self {
        Self {
            executed: RefCell::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }

    pub fn executed(&self) -> Vec<ChangeOperation> {
        self.executed.borrow().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed
            .borrow()
            .iter()
            .map(|op| op.statement.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.executed.borrow().len()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, operation: &ChangeOperation) -> Result<u64, BoxError> {
        if let Some(needle) = &self.fail_on {
            if operation.statement.contains(needle.as_str()) {
                return Err(format!("permission denied: {}", operation.statement).into());
            }
        }
        self.executed.borrow_mut().push(operation.clone());
        Ok(0)
    }
}

//! [`ScriptedDirectory`] replays canned search results in order.

use std::cell::RefCell;
use std::collections::VecDeque;

use rolesync_directory::{BoxError, DirectoryClient, Scope, SearchRow};

/// One recorded search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCall {
    pub base: String,
    pub scope: Scope,
    pub filter: String,
    pub attributes: Vec<String>,
}

/// A directory answering each search with the next scripted response.
///
/// Running out of responses is reported as a search error.
#[derive(Debug, Default)]
pub struct ScriptedDirectory {
    responses: RefCell<VecDeque<Result<Vec<SearchRow>, String>>>,
    calls: RefCell<Vec<SearchCall>>,
}

impl ScriptedDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn respond(self, rows: Vec<SearchRow>) -> Self {
        self.responses.borrow_mut().push_back(Ok(rows));
        self
    }

    /// Queue a failing response
    pub fn fail(self, message: &str) -> Self {
        self.responses.borrow_mut().push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl DirectoryClient for ScriptedDirectory {
    fn search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attributes: &[String],
    ) -> Result<Vec<SearchRow>, BoxError> {
        self.calls.borrow_mut().push(SearchCall {
            base: base.to_string(),
            scope,
            filter: filter.to_string(),
            attributes: attributes.to_vec(),
        });
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(message.into()),
            None => Err(format!("unscripted search of {}", base).into()),
        }
    }
}

//! SQL script executor
//!
//! Writes each operation as a statement of a psql script. A `\connect` line
//! precedes statements bound to a database other than the current one.

use std::cell::RefCell;
use std::io::Write;

use rolesync_core::{BoxError, ChangeOperation, Executor};

pub struct ScriptExecutor<W: Write> {
    out: RefCell<W>,
    database: RefCell<Option<String>>,
}

impl<W: Write> ScriptExecutor<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
            database: RefCell::new(None),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> Executor for ScriptExecutor<W> {
    fn execute(&self, operation: &ChangeOperation) -> Result<u64, BoxError> {
        let mut out = self.out.borrow_mut();
        if let Some(dbname) = &operation.dbname {
            let mut current = self.database.borrow_mut();
            if current.as_deref() != Some(dbname.as_str()) {
                writeln!(out, "\\connect {}", dbname)?;
                *current = Some(dbname.clone());
            }
        }
        writeln!(out, "-- {}", operation.description)?;
        writeln!(out, "{}", operation.statement)?;
        out.flush()?;
        Ok(0)
    }
}

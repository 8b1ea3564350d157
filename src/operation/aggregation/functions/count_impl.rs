use serde::{Deserialize, Serialize};

use crate::{error::{ExecutionError, Result}, types::Value};

/// Running row count. `count(*)` sees every row, `count(expr)` only rows
/// where `expr` is not null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountState {
    pub count: i64,
}

impl CountState {
    pub fn iterate_star(&mut self) {
        self.count += 1;
    }

    pub fn iterate(&mut self, arg: &Value) {
        if !arg.is_null() {
            self.count += 1;
        }
    }

    pub fn merge(&mut self, other: &CountState) -> Result<()> {
        self.count = self.count.checked_add(other.count)
            .ok_or(ExecutionError::NumericOverflow { function: "count" })?;
        Ok(())
    }

    pub fn terminate(&self) -> Value {
        Value::Long(self.count)
    }
}

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{error::{ExecutionError, Result}, types::{DataType, Value}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extremum { Min, Max }

impl Extremum {
    fn prefers(&self, candidate: Ordering) -> bool {
        match self {
            Extremum::Min => candidate.is_lt(),
            Extremum::Max => candidate.is_gt(),
        }
    }
}

/// Current MIN or MAX. Text compares by bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtremaState {
    pub current: Option<Value>,
}

impl ExtremaState {
    /// Only clones `arg` when it replaces the current value.
    pub fn iterate(&mut self, mode: Extremum, arg_type: DataType, arg: &Value) -> Result<()> {
        if arg.is_null() { return Ok(()); }
        if DataType::of(arg) == arg_type {
            return self.offer(mode, arg);
        }
        let coerced = arg_type.coerce(arg.clone())?;
        self.offer(mode, &coerced)
    }

    pub fn merge(&mut self, mode: Extremum, other: &ExtremaState) -> Result<()> {
        match &other.current {
            Some(v) => self.offer(mode, v),
            None => Ok(()),
        }
    }

    pub fn terminate(&self) -> Value {
        self.current.clone().unwrap_or(Value::Null)
    }

    pub fn heap_size(&self) -> usize {
        self.current.as_ref().map_or(0, Value::heap_size)
    }

    fn offer(&mut self, mode: Extremum, candidate: &Value) -> Result<()> {
        match &mut self.current {
            None => self.current = Some(candidate.clone()),
            Some(cur) => {
                let ord = candidate.cmp_same_type(cur).ok_or_else(|| ExecutionError::TypeMismatch {
                    expected: DataType::of(cur),
                    got: DataType::of(candidate),
                })?;
                if mode.prefers(ord) {
                    cur.clone_from(candidate);
                }
            }
        }
        Ok(())
    }
}

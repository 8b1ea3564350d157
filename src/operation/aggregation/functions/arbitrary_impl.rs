use serde::{Deserialize, Serialize};

use crate::{error::Result, types::{DataType, Value}};

/// Keeps the first non-null value seen; any value of the group is a valid
/// answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArbitraryState {
    pub value: Option<Value>,
}

impl ArbitraryState {
    pub fn iterate(&mut self, arg_type: DataType, arg: &Value) -> Result<()> {
        if self.value.is_none() && !arg.is_null() {
            self.value = Some(arg_type.coerce(arg.clone())?);
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &ArbitraryState) {
        if self.value.is_none() {
            self.value.clone_from(&other.value);
        }
    }

    pub fn terminate(&self) -> Value {
        self.value.clone().unwrap_or(Value::Null)
    }

    pub fn heap_size(&self) -> usize {
        self.value.as_ref().map_or(0, Value::heap_size)
    }
}

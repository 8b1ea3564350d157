use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{error::{ExecutionError, Result}, types::{DataType, Value}};

/// AVG keeps a (sum, count) pair. Partials merge the two halves
/// independently; the division only happens in `terminate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvgState {
    pub sum: OrderedFloat<f64>,
    pub count: i64,
}

impl AvgState {
    pub fn iterate(&mut self, arg: &Value) -> Result<()> {
        if arg.is_null() { return Ok(()); }
        let v = arg.as_f64().ok_or(ExecutionError::TypeMismatch {
            expected: DataType::Double,
            got: DataType::of(arg),
        })?;
        self.sum += v;
        self.count += 1;
        Ok(())
    }

    pub fn merge(&mut self, other: &AvgState) -> Result<()> {
        self.count = self.count.checked_add(other.count)
            .ok_or(ExecutionError::NumericOverflow { function: "avg" })?;
        self.sum += other.sum;
        Ok(())
    }

    pub fn terminate(&self) -> Value {
        if self.count == 0 {
            Value::Null
        } else {
            Value::double(self.sum.into_inner() / self.count as f64)
        }
    }
}

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{error::{ExecutionError, Result}, types::Value};

/// Declared type of a group key column or aggregate argument.
///
/// - `Undefined`: the type of a bare null literal.
/// - `String`: UTF-8 text ordered by bytes, never by locale collation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Undefined,
    Boolean,
    Integer,
    Long,
    Double,
    String,
}

impl DataType {
    /// Classify a runtime value. Partial states have no scalar type.
    pub fn of(value: &Value) -> DataType {
        match value {
            Value::Null | Value::Partial(_) => DataType::Undefined,
            Value::Bool(_) => DataType::Boolean,
            Value::Int(_) => DataType::Integer,
            Value::Long(_) => DataType::Long,
            Value::Double(_) => DataType::Double,
            Value::Text(_) => DataType::String,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Long | DataType::Double)
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Long)
    }

    /// Normalise `value` to this type.
    ///
    /// Null passes through every type. Integral values widen to `Long` and
    /// `Double`; everything else must already be of this type.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        let got = DataType::of(&value);
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (DataType::Long, Value::Int(i)) => Ok(Value::Long(i as i64)),
            (DataType::Double, Value::Int(i)) => Ok(Value::double(i as f64)),
            (DataType::Double, Value::Long(l)) => Ok(Value::double(l as f64)),
            (expected, v) if *expected == got => Ok(v),
            (expected, _) => Err(ExecutionError::TypeMismatch { expected: *expected, got }),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Undefined => "undefined",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::Double => "double",
            DataType::String => "string",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_widen() {
        assert_eq!(DataType::Long.coerce(Value::Int(7)).unwrap(), Value::Long(7));
        assert_eq!(DataType::Double.coerce(Value::Long(2)).unwrap(), Value::double(2.0));
        assert_eq!(DataType::Double.coerce(Value::Int(3)).unwrap(), Value::double(3.0));
    }

    #[test]
    fn null_passes_through_every_type() {
        for t in [DataType::Boolean, DataType::Integer, DataType::Long, DataType::Double, DataType::String] {
            assert_eq!(t.coerce(Value::Null).unwrap(), Value::Null);
        }
    }

    #[test]
    fn narrowing_and_cross_kind_are_rejected() {
        let err = DataType::Integer.coerce(Value::Long(1)).unwrap_err();
        assert_eq!(err, ExecutionError::TypeMismatch { expected: DataType::Integer, got: DataType::Long });
        assert!(DataType::String.coerce(Value::Int(1)).is_err());
        assert!(DataType::Boolean.coerce(Value::text("true")).is_err());
    }

    #[test]
    fn deserializes_lowercase_names() {
        let t: DataType = serde_json::from_str("\"string\"").unwrap();
        assert_eq!(t, DataType::String);
        assert_eq!(DataType::Long.to_string(), "long");
    }
}

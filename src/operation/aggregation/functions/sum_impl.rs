use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{error::{ExecutionError, Result}, types::{DataType, Value}};

/// SUM over integral arguments accumulates in i128 and is narrowed to i64
/// only in `terminate`, so whether it overflows depends on the rows and not
/// on the order they or their partials arrive in. SUM over doubles
/// accumulates in f64. `None` until the first non-null value, so an
/// all-null group sums to NULL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SumState {
    Long(Option<i128>),
    Double(Option<OrderedFloat<f64>>),
}

impl SumState {
    pub fn long() -> Self { SumState::Long(None) }

    pub fn double() -> Self { SumState::Double(None) }

    pub fn iterate(&mut self, arg: &Value) -> Result<()> {
        if arg.is_null() { return Ok(()); }
        match self {
            SumState::Long(acc) => {
                let v = arg.as_i64().ok_or(ExecutionError::TypeMismatch {
                    expected: DataType::Long,
                    got: DataType::of(arg),
                })?;
                *acc = Some(add_wide(*acc, v as i128)?);
            }
            SumState::Double(acc) => {
                let v = arg.as_f64().ok_or(ExecutionError::TypeMismatch {
                    expected: DataType::Double,
                    got: DataType::of(arg),
                })?;
                *acc = Some(acc.map_or(OrderedFloat(v), |cur| cur + v));
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &SumState) -> Result<()> {
        match (self, other) {
            (_, SumState::Long(None)) | (_, SumState::Double(None)) => {}
            (SumState::Long(acc), SumState::Long(Some(v))) => {
                *acc = Some(add_wide(*acc, *v)?);
            }
            (SumState::Double(acc), SumState::Double(Some(v))) => {
                *acc = Some(acc.map_or(*v, |cur| cur + *v));
            }
            (SumState::Long(_), SumState::Double(_)) => {
                return Err(ExecutionError::TypeMismatch { expected: DataType::Long, got: DataType::Double });
            }
            (SumState::Double(_), SumState::Long(_)) => {
                return Err(ExecutionError::TypeMismatch { expected: DataType::Double, got: DataType::Long });
            }
        }
        Ok(())
    }

    /// Fails with `NumericOverflow` when an integral total does not fit i64.
    pub fn terminate(&self) -> Result<Value> {
        match self {
            SumState::Long(None) | SumState::Double(None) => Ok(Value::Null),
            SumState::Long(Some(total)) => i64::try_from(*total)
                .map(Value::Long)
                .map_err(|_| ExecutionError::NumericOverflow { function: "sum" }),
            SumState::Double(Some(total)) => Ok(Value::Double(*total)),
        }
    }
}

fn add_wide(acc: Option<i128>, v: i128) -> Result<i128> {
    match acc {
        Some(cur) => cur.checked_add(v).ok_or(ExecutionError::NumericOverflow { function: "sum" }),
        None => Ok(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_are_invisible() {
        let mut s = SumState::long();
        s.iterate(&Value::Null).unwrap();
        assert_eq!(s.terminate().unwrap(), Value::Null);
        s.iterate(&Value::Int(2)).unwrap();
        s.iterate(&Value::Null).unwrap();
        s.iterate(&Value::Long(3)).unwrap();
        assert_eq!(s.terminate().unwrap(), Value::Long(5));
    }

    #[test]
    fn double_sum() {
        let mut s = SumState::double();
        s.iterate(&Value::double(1.5)).unwrap();
        s.iterate(&Value::double(2.25)).unwrap();
        assert_eq!(s.terminate().unwrap(), Value::double(3.75));
    }

    fn fold(vals: &[i64]) -> SumState {
        let mut s = SumState::long();
        for v in vals { s.iterate(&Value::Long(*v)).unwrap(); }
        s
    }

    #[test]
    fn overflow_is_reported_on_the_final_total() {
        let s = fold(&[i64::MAX, 1]);
        assert_eq!(s.terminate(), Err(ExecutionError::NumericOverflow { function: "sum" }));
        assert_eq!(fold(&[i64::MIN, -1]).terminate(), Err(ExecutionError::NumericOverflow { function: "sum" }));
    }

    #[test]
    fn intermediate_overflow_does_not_depend_on_order() {
        let expected = Ok(Value::Long(i64::MAX));
        assert_eq!(fold(&[i64::MAX, 1, -1]).terminate(), expected);
        assert_eq!(fold(&[i64::MAX, -1, 1]).terminate(), expected);

        let (a, b, c) = (fold(&[i64::MAX]), fold(&[1]), fold(&[-1]));
        for (first, second, third) in [(&a, &b, &c), (&a, &c, &b), (&b, &c, &a), (&c, &b, &a)] {
            let mut left = first.clone();
            left.merge(second).unwrap();
            left.merge(third).unwrap();
            assert_eq!(left.terminate(), expected);

            let mut right = second.clone();
            right.merge(third).unwrap();
            let mut outer = first.clone();
            outer.merge(&right).unwrap();
            assert_eq!(outer.terminate(), expected);
        }
    }

    #[test]
    fn merge_with_empty_side_keeps_value() {
        let mut a = SumState::long();
        a.merge(&SumState::long()).unwrap();
        assert_eq!(a.terminate().unwrap(), Value::Null);

        let mut b = SumState::long();
        b.iterate(&Value::Long(4)).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.terminate().unwrap(), Value::Long(4));
    }

    #[test]
    fn text_argument_is_rejected() {
        let mut s = SumState::long();
        assert!(matches!(s.iterate(&Value::text("1")), Err(ExecutionError::TypeMismatch { .. })));
    }
}

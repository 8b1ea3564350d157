use crate::{
    error::{ExecutionError, Result},
    operation::aggregation::{
        AggregateState, ArbitraryState, AvgState, CountState, ExtremaState, Extremum, SumState,
    },
    types::{DataType, Value},
};

/// The fixed set of aggregate kinds, each resolved for concrete argument
/// types.
///
/// Every kind takes at most one argument; `CountStar` takes none. The
/// contract is the usual incremental one:
///   1) `new_state()` when a group is first seen
///   2) `iterate` once per row of the group
///   3) `merge` to combine two partials of the same group
///   4) `terminate` to produce the final scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationFunction {
    CountStar,
    Count(DataType),
    SumLong(DataType),
    SumDouble,
    Avg(DataType),
    Min(DataType),
    Max(DataType),
    Arbitrary(DataType),
}

impl AggregationFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregationFunction::CountStar | AggregationFunction::Count(_) => "count",
            AggregationFunction::SumLong(_) | AggregationFunction::SumDouble => "sum",
            AggregationFunction::Avg(_) => "avg",
            AggregationFunction::Min(_) => "min",
            AggregationFunction::Max(_) => "max",
            AggregationFunction::Arbitrary(_) => "arbitrary",
        }
    }

    pub fn arg_types(&self) -> Vec<DataType> {
        match self {
            AggregationFunction::CountStar => vec![],
            AggregationFunction::SumDouble => vec![DataType::Double],
            AggregationFunction::Count(t)
            | AggregationFunction::SumLong(t)
            | AggregationFunction::Avg(t)
            | AggregationFunction::Min(t)
            | AggregationFunction::Max(t)
            | AggregationFunction::Arbitrary(t) => vec![*t],
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            AggregationFunction::CountStar => 0,
            _ => 1,
        }
    }

    pub fn return_type(&self) -> DataType {
        match self {
            AggregationFunction::CountStar | AggregationFunction::Count(_) | AggregationFunction::SumLong(_) => DataType::Long,
            AggregationFunction::SumDouble | AggregationFunction::Avg(_) => DataType::Double,
            AggregationFunction::Min(t) | AggregationFunction::Max(t) | AggregationFunction::Arbitrary(t) => *t,
        }
    }

    pub fn new_state(&self) -> AggregateState {
        match self {
            AggregationFunction::CountStar | AggregationFunction::Count(_) => AggregateState::Count(CountState::default()),
            AggregationFunction::SumLong(_) => AggregateState::Sum(SumState::long()),
            AggregationFunction::SumDouble => AggregateState::Sum(SumState::double()),
            AggregationFunction::Avg(_) => AggregateState::Avg(AvgState::default()),
            AggregationFunction::Min(_) | AggregationFunction::Max(_) => AggregateState::Extrema(ExtremaState::default()),
            AggregationFunction::Arbitrary(_) => AggregateState::Arbitrary(ArbitraryState::default()),
        }
    }

    /// Fold one row into `state`. `arg` is `None` only for `count(*)`.
    /// Null arguments follow each function's null policy; none of them is
    /// an error.
    pub fn iterate(&self, state: &mut AggregateState, arg: Option<&Value>) -> Result<()> {
        match (self, state, arg) {
            (AggregationFunction::CountStar, AggregateState::Count(s), _) => {
                s.iterate_star();
                Ok(())
            }
            (_, _, None) => Err(self.arity_mismatch()),
            (AggregationFunction::Count(_), AggregateState::Count(s), Some(v)) => {
                s.iterate(v);
                Ok(())
            }
            (AggregationFunction::SumLong(_) | AggregationFunction::SumDouble, AggregateState::Sum(s), Some(v)) => s.iterate(v),
            (AggregationFunction::Avg(_), AggregateState::Avg(s), Some(v)) => s.iterate(v),
            (AggregationFunction::Min(t), AggregateState::Extrema(s), Some(v)) => s.iterate(Extremum::Min, *t, v),
            (AggregationFunction::Max(t), AggregateState::Extrema(s), Some(v)) => s.iterate(Extremum::Max, *t, v),
            (AggregationFunction::Arbitrary(t), AggregateState::Arbitrary(s), Some(v)) => s.iterate(*t, v),
            (_, state, _) => Err(self.state_mismatch(state)),
        }
    }

    /// Combine `other` into `target`. Both must describe the same group and
    /// come from this function.
    pub fn merge_into(&self, target: &mut AggregateState, other: &AggregateState) -> Result<()> {
        match (self, target, other) {
            (AggregationFunction::CountStar | AggregationFunction::Count(_), AggregateState::Count(a), AggregateState::Count(b)) => a.merge(b),
            (AggregationFunction::SumLong(_) | AggregationFunction::SumDouble, AggregateState::Sum(a), AggregateState::Sum(b)) => a.merge(b),
            (AggregationFunction::Avg(_), AggregateState::Avg(a), AggregateState::Avg(b)) => a.merge(b),
            (AggregationFunction::Min(_), AggregateState::Extrema(a), AggregateState::Extrema(b)) => a.merge(Extremum::Min, b),
            (AggregationFunction::Max(_), AggregateState::Extrema(a), AggregateState::Extrema(b)) => a.merge(Extremum::Max, b),
            (AggregationFunction::Arbitrary(_), AggregateState::Arbitrary(a), AggregateState::Arbitrary(b)) => {
                a.merge(b);
                Ok(())
            }
            (_, _, other) => Err(self.state_mismatch(other)),
        }
    }

    /// Stateless merge of two partials for the same group key, as done on a
    /// coordinating node. Associative and commutative over the rows the
    /// partials summarize; double SUM/AVG only up to floating point
    /// rounding.
    pub fn merge(&self, mut a: AggregateState, b: &AggregateState) -> Result<AggregateState> {
        self.merge_into(&mut a, b)?;
        Ok(a)
    }

    /// Final scalar of a group. Only integral SUM can fail here, when its
    /// total does not fit the i64 return type.
    pub fn terminate(&self, state: &AggregateState) -> Result<Value> {
        match state {
            AggregateState::Count(s) => Ok(s.terminate()),
            AggregateState::Sum(s) => s.terminate(),
            AggregateState::Avg(s) => Ok(s.terminate()),
            AggregateState::Extrema(s) => Ok(s.terminate()),
            AggregateState::Arbitrary(s) => Ok(s.terminate()),
        }
    }

    fn arity_mismatch(&self) -> ExecutionError {
        ExecutionError::ArgumentMismatch {
            function: self.name().to_string(),
            expected: format!("{} argument(s)", self.arity()),
            got: vec![],
        }
    }

    fn state_mismatch(&self, state: &AggregateState) -> ExecutionError {
        ExecutionError::ArgumentMismatch {
            function: self.name().to_string(),
            expected: format!("{} state, got {} state", self.name(), state.kind()),
            got: vec![],
        }
    }
}

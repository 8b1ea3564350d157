use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ExecutionError, Result},
    operation::aggregation::AggregationFunction,
    types::DataType,
};

/// Name plus argument types; what the planner hands over to pick an
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionIdent {
    pub name: String,
    pub arg_types: Vec<DataType>,
}

impl FunctionIdent {
    pub fn new(name: &str, arg_types: Vec<DataType>) -> Self {
        Self { name: name.to_string(), arg_types }
    }
}

impl Display for FunctionIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.arg_types.iter().map(ToString::to_string).collect();
        write!(f, "{}({})", self.name, args.join(", "))
    }
}

/// Picks the concrete [`AggregationFunction`] for a set of argument types.
pub type Resolver = fn(&FunctionIdent) -> Result<AggregationFunction>;

/// Case-insensitive registry of aggregates.
///
/// Built once at startup and passed by reference into every execution path;
/// there is no global instance.
#[derive(Default)]
pub struct FunctionRegistry {
    by_name: IndexMap<String, Resolver>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self { by_name: IndexMap::new() } }

    pub fn register(&mut self, name: &str, resolver: Resolver) {
        self.by_name.insert(name.to_ascii_lowercase(), resolver);
    }

    pub fn resolve(&self, ident: &FunctionIdent) -> Result<AggregationFunction> {
        let resolver = self.by_name.get(&ident.name.to_ascii_lowercase())
            .ok_or_else(|| ExecutionError::FunctionNotFound { ident: ident.to_string() })?;
        resolver(ident)
    }

    pub fn get(&self, name: &str, arg_types: &[DataType]) -> Result<AggregationFunction> {
        self.resolve(&FunctionIdent::new(name, arg_types.to_vec()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    pub fn list(&self) -> Vec<String> {
        let mut v: Vec<_> = self.by_name.keys().cloned().collect();
        v.sort();
        v
    }

    pub fn with_builtin_aggregates() -> Self {
        let mut registry = Self::new();
        registry.register("count", resolve_count);
        registry.register("sum", resolve_sum);
        registry.register("avg", resolve_avg);
        registry.register("min", resolve_min);
        registry.register("max", resolve_max);
        registry.register("arbitrary", resolve_arbitrary);
        registry
    }
}

fn mismatch(ident: &FunctionIdent, expected: &str) -> ExecutionError {
    ExecutionError::ArgumentMismatch {
        function: ident.name.to_ascii_lowercase(),
        expected: expected.to_string(),
        got: ident.arg_types.clone(),
    }
}

fn resolve_count(ident: &FunctionIdent) -> Result<AggregationFunction> {
    match ident.arg_types.as_slice() {
        [] => Ok(AggregationFunction::CountStar),
        [t] => Ok(AggregationFunction::Count(*t)),
        _ => Err(mismatch(ident, "COUNT(*|expr)")),
    }
}

fn resolve_sum(ident: &FunctionIdent) -> Result<AggregationFunction> {
    match ident.arg_types.as_slice() {
        [t] if t.is_integral() => Ok(AggregationFunction::SumLong(*t)),
        [DataType::Double] => Ok(AggregationFunction::SumDouble),
        _ => Err(mismatch(ident, "SUM(numeric)")),
    }
}

fn resolve_avg(ident: &FunctionIdent) -> Result<AggregationFunction> {
    match ident.arg_types.as_slice() {
        [t] if t.is_numeric() => Ok(AggregationFunction::Avg(*t)),
        _ => Err(mismatch(ident, "AVG(numeric)")),
    }
}

fn single_typed_arg(ident: &FunctionIdent, expected: &str) -> Result<DataType> {
    match ident.arg_types.as_slice() {
        [DataType::Undefined] => Err(mismatch(ident, expected)),
        [t] => Ok(*t),
        _ => Err(mismatch(ident, expected)),
    }
}

fn resolve_min(ident: &FunctionIdent) -> Result<AggregationFunction> {
    single_typed_arg(ident, "MIN(expr)").map(AggregationFunction::Min)
}

fn resolve_max(ident: &FunctionIdent) -> Result<AggregationFunction> {
    single_typed_arg(ident, "MAX(expr)").map(AggregationFunction::Max)
}

fn resolve_arbitrary(ident: &FunctionIdent) -> Result<AggregationFunction> {
    single_typed_arg(ident, "ARBITRARY(expr)").map(AggregationFunction::Arbitrary)
}

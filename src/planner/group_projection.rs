use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    breaker::RamAccountingContext,
    error::Result,
    operation::{
        CollectExpression, InputBinding, InputCollectExpression,
        aggregation::{AggregationContext, AggregationStep, FunctionIdent, FunctionRegistry},
        projectors::{GroupingProjector, Projector},
    },
    types::{DataType, Value},
};

/// One GROUP BY column of the incoming rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyColumn {
    pub column: usize,
    pub data_type: DataType,
}

/// Where an aggregate argument comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArgSpec {
    Column { column: usize, data_type: DataType },
    Literal { value: Value },
}

impl ArgSpec {
    fn data_type(&self) -> DataType {
        match self {
            ArgSpec::Column { data_type, .. } => *data_type,
            ArgSpec::Literal { value } => DataType::of(value),
        }
    }
}

fn iter_step() -> AggregationStep { AggregationStep::Iter }

fn final_step() -> AggregationStep { AggregationStep::Final }

/// One aggregate call.
///
/// `arg_types` overrides the types derived from `args`; it is needed when
/// `from` is `partial`, because the single argument is then the partial
/// state column while the function is still resolved by its original
/// argument types (e.g. `count(*)` has none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub function: String,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    #[serde(default)]
    pub arg_types: Option<Vec<DataType>>,
    #[serde(default = "iter_step")]
    pub from: AggregationStep,
    #[serde(default = "final_step")]
    pub to: AggregationStep,
}

impl AggregationSpec {
    pub fn ident(&self) -> FunctionIdent {
        let arg_types = self.arg_types.clone()
            .unwrap_or_else(|| self.args.iter().map(ArgSpec::data_type).collect());
        FunctionIdent::new(&self.function, arg_types)
    }
}

/// Serializable description of a grouping stage, as shipped from the
/// planner to every node that runs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProjection {
    pub keys: Vec<KeyColumn>,
    pub aggregations: Vec<AggregationSpec>,
}

impl GroupProjection {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Output row types: key types followed by aggregate return types
    /// (`undefined` for partial outputs).
    pub fn output_types(&self, registry: &FunctionRegistry) -> Result<Vec<DataType>> {
        let mut types: Vec<DataType> = self.keys.iter().map(|k| k.data_type).collect();
        for agg in &self.aggregations {
            let function = registry.resolve(&agg.ident())?;
            types.push(match agg.to {
                AggregationStep::Partial => DataType::Undefined,
                _ => function.return_type(),
            });
        }
        Ok(types)
    }

    /// Resolve functions and bind inputs. Every referenced column gets one
    /// collect expression, shared by keys and aggregates alike.
    pub fn build(
        &self,
        registry: &FunctionRegistry,
        ram_accounting: RamAccountingContext,
        downstream: Box<dyn Projector>,
    ) -> Result<GroupingProjector> {
        let mut columns: IndexMap<usize, usize> = IndexMap::new();
        let mut bind = |column: usize| {
            let next = columns.len();
            InputBinding::Collected(*columns.entry(column).or_insert(next))
        };

        let key_types = self.keys.iter().map(|k| k.data_type).collect();
        let key_inputs = self.keys.iter().map(|k| bind(k.column)).collect();

        let mut aggregations = Vec::with_capacity(self.aggregations.len());
        for spec in &self.aggregations {
            let function = registry.resolve(&spec.ident())?;
            let mut ctx = AggregationContext::new(function, spec.from, spec.to)?;
            for arg in &spec.args {
                ctx.add_input(match arg {
                    ArgSpec::Column { column, .. } => bind(*column),
                    ArgSpec::Literal { value } => InputBinding::literal(value.clone()),
                });
            }
            aggregations.push(ctx);
        }

        let collect_expressions: Vec<Box<dyn CollectExpression>> = columns.keys()
            .map(|column| Box::new(InputCollectExpression::new(*column)) as Box<dyn CollectExpression>)
            .collect();

        let mut projector = GroupingProjector::new(key_types, key_inputs, collect_expressions, aggregations, ram_accounting)?;
        projector.set_downstream(downstream)?;
        Ok(projector)
    }
}

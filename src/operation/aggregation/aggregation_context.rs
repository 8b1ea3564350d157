use crate::{
    error::{ExecutionError, Result},
    operation::{
        CollectExpression, InputBinding,
        aggregation::{AggregateState, AggregationFunction, AggregationStep},
    },
    types::{DataType, Value},
};

/// One aggregate of a grouping stage: the function, its argument bindings
/// and the step it runs in. Its position in the stage's aggregation list is
/// the slot it owns in every group bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationContext {
    function: AggregationFunction,
    from: AggregationStep,
    to: AggregationStep,
    inputs: Vec<InputBinding>,
}

impl AggregationContext {
    pub fn new(function: AggregationFunction, from: AggregationStep, to: AggregationStep) -> Result<Self> {
        AggregationStep::validate(from, to)?;
        Ok(Self { function, from, to, inputs: Vec::new() })
    }

    pub fn add_input(&mut self, input: InputBinding) {
        self.inputs.push(input);
    }

    pub fn with_input(mut self, input: InputBinding) -> Self {
        self.add_input(input);
        self
    }

    pub fn function(&self) -> &AggregationFunction { &self.function }

    pub fn from_step(&self) -> AggregationStep { self.from }

    pub fn to_step(&self) -> AggregationStep { self.to }

    pub fn inputs(&self) -> &[InputBinding] { &self.inputs }

    /// Check argument count and that every binding points at an existing
    /// collect expression.
    pub fn validate(&self, expression_count: usize) -> Result<()> {
        let expected = match self.from {
            AggregationStep::Partial => 1,
            _ => self.function.arity(),
        };
        if self.inputs.len() != expected {
            return Err(ExecutionError::ArgumentMismatch {
                function: self.function.name().to_string(),
                expected: format!("{expected} input(s) in step {}", self.from),
                got: self.function.arg_types(),
            });
        }
        if let Some(idx) = self.inputs.iter().filter_map(InputBinding::expression_index).find(|i| *i >= expression_count) {
            return Err(ExecutionError::InvalidConfig(format!(
                "{} reads collect expression {idx}, only {expression_count} defined",
                self.function.name()
            )));
        }
        Ok(())
    }

    pub fn new_state(&self) -> AggregateState {
        self.function.new_state()
    }

    /// Fold the current row into `state`: raw values are iterated, partial
    /// states are merged. A null partial stands for an empty group.
    pub fn accumulate(&self, state: &mut AggregateState, expressions: &[Box<dyn CollectExpression>]) -> Result<()> {
        let arg = self.inputs.first().map(|i| i.resolve(expressions));
        match self.from {
            AggregationStep::Partial => match arg {
                Some(Value::Partial(partial)) => self.function.merge_into(state, partial),
                Some(Value::Null) | None => Ok(()),
                Some(other) => Err(ExecutionError::TypeMismatch {
                    expected: self.function.return_type(),
                    got: DataType::of(other),
                }),
            },
            _ => self.function.iterate(state, arg),
        }
    }

    /// Turn a finished accumulator into the emitted cell. Partial outputs
    /// are never narrowed, so only a final step can fail.
    pub fn finish(&self, state: AggregateState) -> Result<Value> {
        match self.to {
            AggregationStep::Partial => Ok(Value::Partial(Box::new(state))),
            _ => self.function.terminate(&state),
        }
    }
}

pub mod input;
pub use input::*;

pub mod collect_expression;
pub use collect_expression::*;

pub mod aggregation;

pub mod projectors;

pub mod step;
pub use step::*;

pub mod functions;
pub use functions::*;

pub mod aggregate_state;
pub use aggregate_state::*;

pub mod aggregation_function;
pub use aggregation_function::*;

pub mod aggregation_context;
pub use aggregation_context::*;

pub mod function_registry;
pub use function_registry::*;

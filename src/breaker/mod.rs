pub mod circuit_breaker;
pub use circuit_breaker::*;

pub mod ram_accounting_context;
pub use ram_accounting_context::*;

pub mod projector;
pub use projector::*;

pub mod upstream;
pub use upstream::*;

pub mod group_key;
pub use group_key::*;

pub mod grouper;
pub use grouper::*;

pub mod grouping_projector;
pub use grouping_projector::*;

pub mod collecting_projector;
pub use collecting_projector::*;

pub mod projector_chain;
pub use projector_chain::*;

pub mod group_projection;
pub use group_projection::*;

pub mod data_type;
pub use data_type::*;

pub mod value;
pub use value::*;

/// A row is only valid for the call that delivers it; stages that need
/// its values must copy them.
pub type Row<'a> = &'a [Value];

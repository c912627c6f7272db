//! Labeled geographic partitions (states, climate divisions, stations, ...)
//! carrying one optional value per region, with missing-data semantics and
//! elementwise arithmetic.

pub mod arithmetic;
pub mod catalog;
pub mod cross_reference;
pub mod error;
pub mod reference;
pub mod region_set;
pub mod scheme;
mod table;
pub mod value;

pub use arithmetic::{ArithOp, Operand};
pub use catalog::CatalogScheme;
pub use cross_reference::CrossReference;
pub use error::{RegionError, Result};
pub use region_set::RegionSet;
pub use scheme::{Scheme, SchemeId};
pub use value::Value;

//! Converters for structural (map-shaped) criteria
//!
//! [`StructuralConverter`] builds predicate trees from nested criteria maps;
//! [`OrderByConverter`] builds sort keys from the same field layout.

pub mod order_by;
pub mod structural;

pub use order_by::{Direction, OrderBy, OrderByConverter, SortKey};
pub use structural::StructuralConverter;

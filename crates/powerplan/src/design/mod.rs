//! Study design types: the three choices, the leaf table and the specification.

mod kinds;
mod leaf;
mod spec;

pub use kinds::{DesignKind, MethodKind, Selectable, TestKind};
pub use leaf::{Axis, LEAVES, Leaf, LeafSpec, Param};
pub use spec::StudySpecification;

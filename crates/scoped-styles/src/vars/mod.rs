//! Variable definitions, usages, and their removal from emitted CSS.
//!
//! The passes here run in a fixed order over one stylesheet:
//! [`VariableTable::collect`], then [`VariableResolver::resolve`], then
//! [`strip_definitions`].

mod resolve;
mod strip;
mod table;

pub use resolve::VariableResolver;
pub use strip::strip_definitions;
pub use table::VariableTable;

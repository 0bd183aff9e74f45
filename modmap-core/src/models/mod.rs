//! Data models module for modmap core
//!
//! Input declarations produced by the extractor and the module hierarchy
//! produced by discovery.

pub mod code_unit;
pub mod module_node;

pub use code_unit::{CodeUnit, FileRecord, UnitDependency, UnitKind};
pub use module_node::{ModuleEntry, ModuleForest, ModuleNode};

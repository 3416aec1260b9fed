//! Mapping tables and name resolution for the m2c converter.
//!
//! The converter core never hard-codes Magento class names. It asks a
//! [`Resolver`] to turn a legacy alias (`'tax'`, `'catalog/category'`) into a
//! Magento 2 class and a constructor variable name. The resolver is built
//! once from read-only [`MappingTables`] plus a [`VariableNamer`] and shared
//! across worker threads.

mod namer;
mod resolve;
mod tables;

pub use namer::{ModuleQualifiedNamer, NamerKind, TrailingSegmentNamer, VariableNamer};
pub use resolve::{AliasKind, ResolvedClass, Resolver};
pub use tables::{AliasTables, ConfigError, MappingTables};

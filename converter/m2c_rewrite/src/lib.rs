//! Token-stream rewriting engine for Magento 1 to Magento 2 conversion.
//!
//! Converts legacy `Mage::*` lookups in a PHP class into accesses to
//! constructor-injected dependencies, editing the token stream from
//! [`m2c_lexer`] so that untouched code keeps its exact bytes.
//!
//! # Pipeline
//!
//! - [`constructor`] finds the class, its parent and its constructor;
//! - [`call_site`] recognizes legacy calls and plans their replacement;
//! - [`inject`] adds constructor parameters, assignments and properties;
//! - [`processor`] runs one file through all of the above.
//!
//! Every structural change goes through an [`EditLog`], which applies
//! index-addressed edits rightmost first.

pub mod call_site;
pub mod constructor;
pub mod edit;
mod error;
pub mod inject;
pub mod processor;

pub use call_site::{CallShape, CallSiteMatch, Dependency, Dispatcher};
pub use constructor::{find_class, locate, ConstructorDescriptor, Parameter, CONSTRUCTOR_MARKER};
pub use edit::{EditConflict, EditLog, TokenEdit};
pub use error::RewriteError;
pub use inject::{inject, ArgumentSpec, ConstructorHelper, InjectionError, InjectionOptions};
pub use processor::{Conversion, ConvertedSource, Processor};

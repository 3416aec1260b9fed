//! Legacy alias and class resolution.
//!
//! Resolution is two steps:
//!
//! 1. alias to Magento 1 class: `('helper', 'tax')` becomes
//!    `Mage_Tax_Helper_Data`, `('model', 'catalog/category')` becomes
//!    `Mage_Catalog_Model_Category`. Alias tables override the conventional
//!    `Mage_<Group>_<Layer>` prefix per group, or map whole aliases.
//! 2. Magento 1 class to Magento 2 class: the class table first, otherwise
//!    the naming convention (`Mage_` to `\Magento\`, `_` to `\`, resource
//!    models under `ResourceModel`).

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::namer::{ModuleQualifiedNamer, VariableNamer};
use crate::tables::MappingTables;

/// Which legacy factory an alias was passed to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AliasKind {
    Helper,
    Model,
    ResourceModel,
}

impl AliasKind {
    fn table(self, tables: &MappingTables) -> &FxHashMap<String, String> {
        match self {
            AliasKind::Helper => &tables.aliases.helper,
            AliasKind::Model => &tables.aliases.model,
            AliasKind::ResourceModel => &tables.aliases.resource_model,
        }
    }

    /// Class-name layer appended to the module in the conventional prefix.
    fn layer(self) -> &'static str {
        match self {
            AliasKind::Helper => "Helper",
            AliasKind::Model => "Model",
            AliasKind::ResourceModel => "Model_Resource",
        }
    }
}

/// A Magento 2 class and the variable it is injected as.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResolvedClass {
    /// Fully qualified with a leading `\`.
    pub class: String,
    pub variable_name: String,
}

/// Alias and class resolution over read-only tables.
#[derive(Clone, Debug)]
pub struct Resolver {
    tables: Arc<MappingTables>,
    namer: Arc<dyn VariableNamer>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver::new(Arc::default(), Arc::new(ModuleQualifiedNamer))
    }
}

impl Resolver {
    pub fn new(tables: Arc<MappingTables>, namer: Arc<dyn VariableNamer>) -> Self {
        Resolver { tables, namer }
    }

    /// Resolve a legacy alias all the way to a Magento 2 class and variable.
    ///
    /// Returns `None` when the alias cannot name a class (empty, or a model
    /// alias without a `/`).
    pub fn resolve(&self, kind: AliasKind, alias: &str) -> Option<ResolvedClass> {
        let legacy = self.legacy_class(kind, alias)?;
        let class = self.target_class(&legacy);
        let variable_name = self.variable_name(&class);
        tracing::trace!(?kind, alias, %legacy, %class, %variable_name, "resolved alias");
        Some(ResolvedClass {
            class,
            variable_name,
        })
    }

    pub fn variable_name(&self, class: &str) -> String {
        self.namer.variable_name(class)
    }

    /// Magento 1 class name for an alias.
    pub fn legacy_class(&self, kind: AliasKind, alias: &str) -> Option<String> {
        let alias = alias.trim();
        if alias.is_empty() {
            return None;
        }
        let table = kind.table(&self.tables);
        if let Some(class) = table.get(alias) {
            return Some(class.clone());
        }

        let (group, rest) = match alias.split_once('/') {
            Some((group, rest)) if !group.is_empty() => (group, rest),
            Some(_) => return None,
            None if looks_like_class(alias) => return Some(alias.to_owned()),
            None if kind == AliasKind::Helper => (alias, "data"),
            None => return None,
        };
        let rest = if rest.is_empty() {
            if kind != AliasKind::Helper {
                return None;
            }
            "data"
        } else {
            rest
        };

        let prefix = match table.get(group) {
            Some(prefix) => prefix.clone(),
            None => format!("Mage_{}_{}", upper_words(group), kind.layer()),
        };
        Some(format!("{prefix}_{}", upper_words(rest)))
    }

    /// Magento 2 class for a Magento 1 class, with a leading `\`.
    pub fn target_class(&self, legacy: &str) -> String {
        if let Some(mapped) = self.tables.classes.get(legacy) {
            return qualify(mapped);
        }
        if legacy.contains('\\') {
            return qualify(legacy);
        }

        let namespaced = match legacy.strip_prefix("Mage_") {
            Some(rest) => format!("\\Magento\\{}", rest.replace('_', "\\")),
            None => format!("\\{}", legacy.replace('_', "\\")),
        };
        namespaced
            .replace("\\Model\\Resource\\", "\\Model\\ResourceModel\\")
            .replace("\\Model\\Mysql4\\", "\\Model\\ResourceModel\\")
    }
}

/// `Mage_Catalog_Model_Product` or `\Foo\Bar`, as opposed to a bare group.
fn looks_like_class(alias: &str) -> bool {
    alias.starts_with('\\')
        || (alias.contains(['_', '\\']) && alias.starts_with(|c: char| c.is_ascii_uppercase()))
}

/// `product_collection` becomes `Product_Collection`.
fn upper_words(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}

fn qualify(class: &str) -> String {
    if class.starts_with('\\') {
        class.to_owned()
    } else {
        format!("\\{class}")
    }
}

//! Mapping table data, loaded from JSON.
//!
//! ```json
//! {
//!   "classes": { "Mage_Core_Model_Store": "\\Magento\\Store\\Model\\Store" },
//!   "aliases": {
//!     "helper": { "tax": "Mage_Tax_Helper" },
//!     "model": { "catalog": "Mage_Catalog_Model", "sales/quote": "Mage_Sales_Model_Quote" },
//!     "resource_model": { "catalog": "Mage_Catalog_Model_Resource" }
//!   }
//! }
//! ```
//!
//! Every section is optional. Empty tables fall back to the naming
//! conventions implemented in [`crate::Resolver`].

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Error loading mapping tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read mapping file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid mapping file `{}`: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Legacy alias prefixes per lookup kind.
///
/// Keys are either a module group (`catalog`) mapping to a class prefix, or a
/// full alias (`catalog/category`) mapping to a complete class name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AliasTables {
    pub helper: FxHashMap<String, String>,
    pub model: FxHashMap<String, String>,
    pub resource_model: FxHashMap<String, String>,
}

/// Read-only class and alias tables.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MappingTables {
    /// Magento 1 class name to Magento 2 class name.
    pub classes: FxHashMap<String, String>,
    pub aliases: AliasTables,
}

impl MappingTables {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read and parse a mapping file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let tables = Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            classes = tables.classes.len(),
            helpers = tables.aliases.helper.len(),
            models = tables.aliases.model.len(),
            resource_models = tables.aliases.resource_model.len(),
            "loaded mapping tables"
        );
        Ok(tables)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.aliases.helper.is_empty()
            && self.aliases.model.is_empty()
            && self.aliases.resource_model.is_empty()
    }
}

//! Constructor variable naming.
//!
//! The name given to an injected dependency is a deterministic function of
//! its class. Two strategies ship:
//!
//! | Class | [`ModuleQualifiedNamer`] | [`TrailingSegmentNamer`] |
//! |---|---|---|
//! | `\Magento\Tax\Helper\Data` | `taxHelper` | `data` |
//! | `\Magento\Catalog\Model\Category` | `catalogCategory` | `category` |
//! | `\Magento\Store\Model\StoreManagerInterface` | `storeStoreManager` | `storeManager` |
//!
//! Namers are shared across worker threads, hence `Send + Sync`.

use std::fmt;
use std::sync::Arc;

/// Derives a variable name (without `$`) from a fully qualified class name.
pub trait VariableNamer: Send + Sync + fmt::Debug {
    fn variable_name(&self, class: &str) -> String;
}

/// `\Vendor\Module\Layer\Rest...` becomes `module` + `Rest...`.
///
/// Helpers keep a `Helper` suffix and drop a trailing `Data` (`taxHelper`,
/// `catalogProductHelper`). Resource models gain a `Resource` suffix unless
/// they are collections. Names that do not follow the
/// vendor/module/layer layout fall back to [`TrailingSegmentNamer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ModuleQualifiedNamer;

impl VariableNamer for ModuleQualifiedNamer {
    fn variable_name(&self, class: &str) -> String {
        let segments = segments(class);
        let [_vendor, module, layer, rest @ ..] = segments.as_slice() else {
            return TrailingSegmentNamer.variable_name(class);
        };
        if rest.is_empty() {
            return TrailingSegmentNamer.variable_name(class);
        }

        let mut name = lower_first(module);
        match *layer {
            "Helper" => {
                let rest = match rest {
                    [init @ .., "Data"] => init,
                    _ => rest,
                };
                rest.iter().for_each(|s| name.push_str(s));
                name.push_str("Helper");
            }
            "Model" => match rest {
                ["ResourceModel", tail @ ..] if !tail.is_empty() => {
                    tail.iter().for_each(|s| name.push_str(s));
                    if tail.last() != Some(&"Collection") {
                        name.push_str("Resource");
                    }
                }
                _ => rest.iter().for_each(|s| name.push_str(s)),
            },
            _ => {
                name.push_str(layer);
                rest.iter().for_each(|s| name.push_str(s));
            }
        }
        if let Some(len) = name.strip_suffix("Interface").map(str::len) {
            name.truncate(len);
        }
        sanitize(&name)
    }
}

/// Last class-name segment, `Interface` suffix removed, first letter lowered.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrailingSegmentNamer;

impl VariableNamer for TrailingSegmentNamer {
    fn variable_name(&self, class: &str) -> String {
        let last = segments(class).last().copied().unwrap_or("dependency");
        let trimmed = match last.strip_suffix("Interface") {
            Some(stem) if !stem.is_empty() => stem,
            _ => last,
        };
        sanitize(&lower_first(trimmed))
    }
}

/// Namer selection, as exposed to configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NamerKind {
    #[default]
    ModuleQualified,
    TrailingSegment,
}

impl NamerKind {
    pub fn build(self) -> Arc<dyn VariableNamer> {
        match self {
            NamerKind::ModuleQualified => Arc::new(ModuleQualifiedNamer),
            NamerKind::TrailingSegment => Arc::new(TrailingSegmentNamer),
        }
    }
}

/// Namespace segments of `\A\B\C` or `A_B_C`.
fn segments(class: &str) -> Vec<&str> {
    let separator = if class.contains('\\') { '\\' } else { '_' };
    class.split(separator).filter(|s| !s.is_empty()).collect()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Keep only characters valid in a PHP variable name.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    match cleaned.chars().next() {
        None => "dependency".to_owned(),
        Some(c) if c.is_ascii_digit() => format!("_{cleaned}"),
        Some(_) => cleaned,
    }
}

//! The closed set of legacy call shapes.

use std::fmt;
use std::ops::RangeInclusive;

/// One recognized `Mage::<method>(...)` form.
///
/// Adding a legacy call form means adding a variant here and its
/// replacement in [`Dispatcher`](super::Dispatcher).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CallShape {
    /// `Mage::helper('tax')`
    Helper,
    /// `Mage::getModel('catalog/category'[, $data])`
    GetModel,
    /// `Mage::getSingleton('customer/session')`
    GetSingleton,
    /// `Mage::getResourceModel('catalog/product_collection'[, $data])`
    GetResourceModel,
    /// `Mage::getResourceSingleton('catalog/product')`
    GetResourceSingleton,
    /// `Mage::getStoreConfig($path[, $store])`
    GetStoreConfig,
    /// `Mage::getStoreConfigFlag($path[, $store])`
    GetStoreConfigFlag,
    /// `Mage::dispatchEvent($name[, $data])`
    DispatchEvent,
    /// `Mage::logException($e)`
    LogException,
    /// `Mage::log($message)`, one argument only.
    Log,
}

impl CallShape {
    /// Every shape, in dispatch priority order.
    pub const ALL: [CallShape; 10] = [
        CallShape::Helper,
        CallShape::GetModel,
        CallShape::GetSingleton,
        CallShape::GetResourceModel,
        CallShape::GetResourceSingleton,
        CallShape::GetStoreConfig,
        CallShape::GetStoreConfigFlag,
        CallShape::DispatchEvent,
        CallShape::LogException,
        CallShape::Log,
    ];

    /// Static method name on `Mage`, matched case-insensitively.
    pub fn method(self) -> &'static str {
        match self {
            CallShape::Helper => "helper",
            CallShape::GetModel => "getModel",
            CallShape::GetSingleton => "getSingleton",
            CallShape::GetResourceModel => "getResourceModel",
            CallShape::GetResourceSingleton => "getResourceSingleton",
            CallShape::GetStoreConfig => "getStoreConfig",
            CallShape::GetStoreConfigFlag => "getStoreConfigFlag",
            CallShape::DispatchEvent => "dispatchEvent",
            CallShape::LogException => "logException",
            CallShape::Log => "log",
        }
    }

    /// Accepted argument counts.
    pub fn arity(self) -> RangeInclusive<usize> {
        match self {
            CallShape::Helper
            | CallShape::GetSingleton
            | CallShape::GetResourceSingleton
            | CallShape::LogException
            | CallShape::Log => 1..=1,
            CallShape::GetModel
            | CallShape::GetResourceModel
            | CallShape::GetStoreConfig
            | CallShape::GetStoreConfigFlag
            | CallShape::DispatchEvent => 1..=2,
        }
    }

    /// Shapes whose first argument is a class alias string.
    pub fn is_alias_lookup(self) -> bool {
        matches!(
            self,
            CallShape::Helper
                | CallShape::GetModel
                | CallShape::GetSingleton
                | CallShape::GetResourceModel
                | CallShape::GetResourceSingleton
        )
    }

    /// Alias lookups resolve framework objects whose class is expected to
    /// initialize its parent. Framework services (config, events, logging)
    /// carry no such expectation.
    pub fn requires_parent_constructor_call(self) -> bool {
        self.is_alias_lookup()
    }

    pub(crate) fn accepts(self, method: &str, arguments: usize) -> bool {
        method.eq_ignore_ascii_case(self.method()) && self.arity().contains(&arguments)
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mage::{}", self.method())
    }
}

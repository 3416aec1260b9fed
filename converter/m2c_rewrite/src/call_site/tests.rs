use std::sync::Arc;

use m2c_lexer::tokenize;
use m2c_mapping::{MappingTables, ModuleQualifiedNamer, TrailingSegmentNamer};
use pretty_assertions::assert_eq;

use super::*;

fn lex(source: &str) -> TokenStream {
    tokenize(source).unwrap_or_else(|e| panic!("lex failed: {e}"))
}

/// Convert the first call in `<?php <code>;` and return (shape, replacement, dependency).
fn convert_with(resolver: &Resolver, code: &str) -> Option<(CallShape, String, Dependency)> {
    let stream = lex(&format!("<?php {code};"));
    Dispatcher::new(resolver)
        .dispatch(&stream, 1)
        .map(|m| (m.shape, m.replacement_text(), m.dependency))
}

fn convert(code: &str) -> Option<(CallShape, String, Dependency)> {
    convert_with(&Resolver::default(), code)
}

fn replacement(code: &str) -> String {
    convert(code)
        .map(|(_, text, _)| text)
        .unwrap_or_else(|| panic!("no match for {code}"))
}

#[test]
fn helper_becomes_property_access() {
    assert_eq!(
        convert("Mage::helper('tax')"),
        Some((
            CallShape::Helper,
            "$this->taxHelper".to_owned(),
            Dependency::new("\\Magento\\Tax\\Helper\\Data", "taxHelper"),
        ))
    );
}

#[test]
fn get_model_becomes_factory_create() {
    assert_eq!(
        convert("Mage::getModel('catalog/category')"),
        Some((
            CallShape::GetModel,
            "$this->catalogCategoryFactory->create()".to_owned(),
            Dependency::new("\\Magento\\Catalog\\Model\\CategoryFactory", "catalogCategoryFactory"),
        ))
    );
    assert_eq!(
        replacement("Mage::getModel('catalog/category', array('id' => 1))"),
        "$this->catalogCategoryFactory->create(['data' => array('id' => 1)])"
    );
}

#[test]
fn singletons_are_shared_instances() {
    assert_eq!(
        convert("Mage::getSingleton('customer/session')"),
        Some((
            CallShape::GetSingleton,
            "$this->customerSession".to_owned(),
            Dependency::new("\\Magento\\Customer\\Model\\Session", "customerSession"),
        ))
    );
    let (shape, _, dependency) = convert("Mage::getResourceSingleton('catalog/product')")
        .unwrap_or_else(|| panic!("no match"));
    assert_eq!(shape, CallShape::GetResourceSingleton);
    assert_eq!(dependency.class, "\\Magento\\Catalog\\Model\\ResourceModel\\Product");
}

#[test]
fn resource_model_becomes_factory() {
    let (shape, text, dependency) = convert("Mage::getResourceModel('catalog/product_collection')")
        .unwrap_or_else(|| panic!("no match"));
    assert_eq!(shape, CallShape::GetResourceModel);
    assert_eq!(
        dependency.class,
        "\\Magento\\Catalog\\Model\\ResourceModel\\Product\\CollectionFactory"
    );
    assert_eq!(text, format!("$this->{}->create()", dependency.variable_name));
}

#[test]
fn store_config_gets_scope() {
    assert_eq!(
        replacement("Mage::getStoreConfig('web/secure/base_url')"),
        "$this->scopeConfig->getValue('web/secure/base_url', \\Magento\\Store\\Model\\ScopeInterface::SCOPE_STORE)"
    );
    assert_eq!(
        replacement("Mage::getStoreConfigFlag(self::XML_PATH, $store)"),
        "$this->scopeConfig->isSetFlag(self::XML_PATH, \\Magento\\Store\\Model\\ScopeInterface::SCOPE_STORE, $store)"
    );
    let (_, _, dependency) =
        convert("Mage::getStoreConfig($path)").unwrap_or_else(|| panic!("no match"));
    assert_eq!(
        dependency,
        Dependency::new("\\Magento\\Framework\\App\\Config\\ScopeConfigInterface", "scopeConfig")
    );
}

#[test]
fn services_forward_arguments_verbatim() {
    assert_eq!(
        replacement("Mage::dispatchEvent('order_save', array( 'order' => $order ))"),
        "$this->eventManager->dispatch('order_save', array( 'order' => $order ))"
    );
    assert_eq!(
        replacement("Mage::logException($e)"),
        "$this->logger->critical($e)"
    );
    assert_eq!(replacement("Mage::log( $message )"), "$this->logger->debug( $message )");
}

#[test]
fn log_with_extra_arguments_is_left_alone() {
    assert_eq!(convert("Mage::log($message, null, 'custom.log')"), None);
}

#[test]
fn method_and_receiver_case_insensitive() {
    assert_eq!(replacement("\\Mage::HELPER('tax')"), "$this->taxHelper");
    assert_eq!(replacement("mage::getmodel('catalog/category')"), "$this->catalogCategoryFactory->create()");
}

#[test]
fn alias_must_be_constant_string() {
    assert_eq!(convert("Mage::helper($name)"), None);
    assert_eq!(convert("Mage::getModel(\"catalog/$entity\")"), None);
    assert_eq!(convert("Mage::getModel('catalog/' . $entity)"), None);
    assert_eq!(
        replacement("Mage::getModel(\"catalog/category\")"),
        "$this->catalogCategoryFactory->create()"
    );
}

#[test]
fn arity_is_checked() {
    assert_eq!(convert("Mage::helper()"), None);
    assert_eq!(convert("Mage::helper('tax', 1)"), None);
    assert_eq!(convert("Mage::getModel('a/b', [], 3)"), None);
}

#[test]
fn unknown_methods_and_receivers_do_not_match() {
    assert_eq!(convert("Mage::app()"), None);
    assert_eq!(convert("Mage::getBaseDir('media')"), None);
    assert_eq!(convert("Other::helper('tax')"), None);
    assert_eq!(convert("Mage::$helper('tax')"), None);
}

#[test]
fn member_named_mage_is_not_a_receiver() {
    let stream = lex("<?php $x->Mage::helper('tax'); Foo::Mage::helper('tax');");
    let resolver = Resolver::default();
    let dispatcher = Dispatcher::new(&resolver);
    let mage_indices: Vec<usize> = (0..stream.len()).filter(|&i| stream[i].is_name("Mage")).collect();
    assert_eq!(mage_indices.len(), 2);
    for index in mage_indices {
        assert_eq!(dispatcher.dispatch(&stream, index), None);
    }
}

#[test]
fn unresolvable_model_alias_is_not_a_match() {
    assert_eq!(convert("Mage::getModel('')"), None);
    assert_eq!(convert("Mage::getModel('nogroup')"), None);
}

#[test]
fn match_covers_the_whole_call() {
    let stream = lex("<?php $x = Mage::helper( 'tax' )->format($y);");
    let resolver = Resolver::default();
    let index = (0..stream.len())
        .find(|&i| stream[i].is_name("Mage"))
        .unwrap_or_else(|| panic!("no receiver"));
    let found = Dispatcher::new(&resolver)
        .dispatch(&stream, index)
        .unwrap_or_else(|| panic!("no match"));
    assert_eq!(found.token_index, index);
    assert_eq!(stream.text_of(found.range()), "Mage::helper( 'tax' )");
    assert!(found.requires_parent_constructor_call);
    assert!(found.replacement_tokens.iter().all(|t| t.line == 0));
}

#[test]
fn nested_calls_are_converted_and_reported() {
    let stream = lex("<?php Mage::getStoreConfig(Mage::helper('tax')->configPath(), Mage::getModel('core/store'));");
    let resolver = Resolver::default();
    let found = Dispatcher::new(&resolver)
        .dispatch(&stream, 1)
        .unwrap_or_else(|| panic!("no match"));
    assert_eq!(
        found.replacement_text(),
        "$this->scopeConfig->getValue($this->taxHelper->configPath(), \\Magento\\Store\\Model\\ScopeInterface::SCOPE_STORE, $this->coreStoreFactory->create())"
    );
    assert!(!found.requires_parent_constructor_call);
    assert!(found.nested.iter().all(|m| m.requires_parent_constructor_call));
    let names: Vec<&str> = found
        .dependencies()
        .into_iter()
        .map(|d| d.variable_name.as_str())
        .collect();
    assert_eq!(names, vec!["scopeConfig", "taxHelper", "coreStoreFactory"]);
}

#[test]
fn services_do_not_require_parent_call() {
    for shape in CallShape::ALL {
        assert_eq!(shape.requires_parent_constructor_call(), shape.is_alias_lookup());
    }
    assert!(!CallShape::Log.requires_parent_constructor_call());
}

#[test]
fn mapping_tables_and_namer_are_consulted() {
    let tables = MappingTables::from_json(
        r#"{"aliases": {"helper": {"mymodule": "Acme_MyModule_Helper_Data"}},
            "classes": {"Acme_MyModule_Helper_Data": "Acme\\MyModule\\Helper\\Data"}}"#,
    )
    .unwrap_or_else(|e| panic!("{e}"));
    let resolver = Resolver::new(Arc::new(tables), Arc::new(ModuleQualifiedNamer));
    assert_eq!(
        convert_with(&resolver, "Mage::helper('mymodule')").map(|(_, _, d)| d),
        Some(Dependency::new("\\Acme\\MyModule\\Helper\\Data", "myModuleHelper"))
    );

    let trailing = Resolver::new(Arc::default(), Arc::new(TrailingSegmentNamer));
    assert_eq!(
        convert_with(&trailing, "Mage::getSingleton('customer/session')").map(|(_, text, _)| text),
        Some("$this->session".to_owned())
    );
}

#[test]
fn dependency_to_spec() {
    let spec = Dependency::new("\\Psr\\Log\\LoggerInterface", "logger").to_spec();
    assert_eq!(spec, ArgumentSpec::new("\\Psr\\Log\\LoggerInterface", "logger"));
}

#[test]
fn shape_display_and_priority() {
    assert_eq!(CallShape::GetModel.to_string(), "Mage::getModel");
    assert_eq!(CallShape::ALL[0], CallShape::Helper);
}

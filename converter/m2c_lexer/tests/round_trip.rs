//! Round-trip property tests for the tokenizer.
//!
//! `reconstruct(tokenize(src))` must reproduce `src` byte for byte for every
//! input the tokenizer accepts, including inputs built from awkward pieces:
//! mixed line endings, comments next to close tags, heredocs and templates.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use m2c_lexer::{reconstruct, tokenize, TokenKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// -- Generation Strategies --

/// Code fragments that each lex cleanly and keep delimiters balanced.
fn fragment_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "$a = 1;",
        "$this->x = $x;",
        "Mage::helper('tax')->f();",
        "Mage::getModel(\"catalog/category\", ['a' => 1]);",
        "// comment\n",
        "# hash comment\n",
        "/* block */",
        "/** @var int */",
        "function list(array $a = [], ...$rest) { return $a; }",
        "class A extends \\B\\C implements D { public function __construct() {} }",
        "$s = \"esc \\\" {$x}\";",
        "$n = 0x1F + .5 - 1_000;",
        "$h = <<<EOT\n  body {\n  EOT;\n",
        "$w = <<<'NOW'\n)\nNOW;\n",
        "#[Attr(1)]",
        "$a?->b::c;",
        "echo $x ?? 'd';",
    ])
    .prop_map(str::to_owned)
}

fn separator_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![" ", "\n", "\r\n", "\t", "\n    ", ""]).prop_map(str::to_owned)
}

/// HTML text that never contains `<?`.
fn html_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z <>/=\"\n]{0,30}")
        .expect("valid regex")
        .prop_map(|s| s.replace("<?", "< ?"))
}

fn php_file_strategy() -> impl Strategy<Value = String> {
    (
        html_strategy(),
        prop::collection::vec((fragment_strategy(), separator_strategy()), 0..12),
        prop::bool::ANY,
        html_strategy(),
    )
        .prop_map(|(lead, body, close, tail)| {
            let mut src = lead;
            src.push_str("<?php\n");
            for (fragment, sep) in body {
                src.push_str(&fragment);
                src.push_str(if sep.is_empty() { " " } else { &sep });
            }
            if close {
                src.push_str("?>");
                src.push_str(&tail);
            }
            src
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn generated_files_round_trip(src in php_file_strategy()) {
        let stream = tokenize(&src).expect("generated source lexes");
        prop_assert_eq!(reconstruct(&stream), src);
    }

    #[test]
    fn accepted_input_always_round_trips(src in "\\PC{0,80}") {
        if let Ok(stream) = tokenize(&src) {
            prop_assert_eq!(reconstruct(&stream), src);
        }
    }

    #[test]
    fn no_token_is_empty(src in php_file_strategy()) {
        let stream = tokenize(&src).expect("generated source lexes");
        prop_assert!(stream.iter().all(|t| !t.text.is_empty()));
    }
}

#[test]
fn magento_class_round_trips() {
    let src = r#"<?php
/**
 * Block.
 */
class Mage_Tax_Block_Sample extends Mage_Core_Block_Template
{
    /** @var int */
    protected $_count = 0;

    public function __construct(
        \Magento\Framework\View\Element\Template\Context $context,
        array $data = []
    ) {
        parent::__construct($context, $data);
    }

    public function label()
    {
        return Mage::helper('tax')->__("Tax {$this->_count}");
    }
}
"#;
    let stream = tokenize(src).unwrap();
    assert_eq!(reconstruct(&stream), src);
    let keywords = stream.iter().filter(|t| t.is(TokenKind::Keyword)).count();
    assert!(keywords >= 8);
}

#[test]
fn phtml_template_round_trips() {
    let src = "<ul>\r\n<?php foreach ($items as $item): ?>\r\n  <li><?= $item ?></li>\r\n<?php endforeach ?>\r\n</ul>\r\n";
    let stream = tokenize(src).unwrap();
    assert_eq!(reconstruct(&stream), src);
}

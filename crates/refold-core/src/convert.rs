//! Block conversion driver.
//!
//! Wires the pipeline end to end: analyze → classify → translate → render.
//! Each top-level block is one independent conversion; nothing is shared
//! between blocks, so a translation unit's blocks could be converted in any
//! order (or concurrently).

use crate::analysis::analyze_block;
use crate::ast::Node;
use crate::classify::{classify, prune_conditionals};
use crate::config::PassConfig;
use crate::error::CoreError;
use crate::func::FuncDef;
use crate::render::Renderer;
use crate::translate::{Diagnostic, Translator};

/// The result of converting one block: the functional source text and
/// whatever the translator had to drop along the way.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts top-level blocks into functional source text under a fixed
/// pass configuration.
#[derive(Debug, Default)]
pub struct BlockConverter {
    config: PassConfig,
}

impl BlockConverter {
    pub fn new(config: PassConfig) -> Self {
        Self { config }
    }

    /// Convert one block. A non-block node is treated as a one-statement
    /// block.
    pub fn convert(&self, block: &Node) -> Result<Conversion, CoreError> {
        let items = block.as_block_items();

        let analysis = analyze_block(items)?;
        let sets = prune_conditionals(&analysis.events, &classify(&analysis.events));

        let mut translator = Translator::new();
        let def = FuncDef {
            inputs: analysis.reads.clone(),
            outputs: analysis.output_args(),
            items: translator.translate_block(items)?,
        };

        let text = Renderer::new(&self.config, &sets).render(&def);
        Ok(Conversion {
            text,
            diagnostics: translator.into_diagnostics(),
        })
    }
}

/// Convert every top-level block of a translation unit independently.
/// Non-block nodes at the top level are skipped — the unit contract is one
/// block per function body.
pub fn convert_program(nodes: &[Node], config: &PassConfig) -> Result<Vec<Conversion>, CoreError> {
    let converter = BlockConverter::new(config.clone());
    let mut conversions = Vec::new();
    for node in nodes {
        if matches!(node, Node::Block(_)) {
            conversions.push(converter.convert(node)?);
        }
    }
    Ok(conversions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(n: i64) -> Node {
        Node::Constant(json!(n))
    }

    fn id(name: &str) -> Node {
        Node::Id(name.into())
    }

    fn bin(op: &str, left: Node, right: Node) -> Node {
        Node::BinaryOp {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn decl(name: &str, init: Node) -> Node {
        Node::Decl {
            name: name.into(),
            init: Some(Box::new(init)),
        }
    }

    #[test]
    fn converts_a_simple_block() {
        let block = Node::Block(vec![
            decl("a", num(5)),
            decl("b", bin("+", id("a"), num(2))),
            id("b"),
        ]);
        let converter = BlockConverter::new(PassConfig::disabled());
        let conversion = converter.convert(&block).unwrap();
        assert_eq!(
            conversion.text,
            "fun block_function(a) returns (b) =\n\tlet a = 5 in \n\tlet b = a + 2 in \n\t(b)"
        );
        assert!(conversion.diagnostics.is_empty());
    }

    #[test]
    fn program_conversion_keeps_blocks_independent() {
        let unit = vec![
            Node::Block(vec![decl("a", num(1)), id("a")]),
            Node::Block(vec![decl("a", num(2)), id("a")]),
        ];
        let conversions = convert_program(&unit, &PassConfig::default()).unwrap();
        assert_eq!(conversions.len(), 2);
        assert_eq!(
            conversions[0].text,
            "fun block_function() returns (a) =\n\tlet a = 1 in \n\t(a)"
        );
        assert_eq!(
            conversions[1].text,
            "fun block_function() returns (a) =\n\tlet a = 2 in \n\t(a)"
        );
    }

    #[test]
    fn diagnostics_surface_without_failing() {
        let block = Node::Block(vec![
            Node::Block(vec![decl("x", num(1))]),
            decl("a", num(1)),
            id("a"),
        ]);
        let converter = BlockConverter::default();
        let conversion = converter.convert(&block).unwrap();
        assert_eq!(conversion.diagnostics.len(), 1);
        assert!(conversion.text.contains("let a = 1 in "));
    }
}

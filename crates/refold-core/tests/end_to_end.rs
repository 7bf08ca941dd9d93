//! End-to-end conversion scenarios: imperative block in, functional text out.

use refold_core::{convert_program, BlockConverter, CoreError, Node, PassConfig};
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

fn assign(lvalue: Node, rvalue: Node) -> Node {
    Node::Assignment {
        lvalue: Box::new(lvalue),
        rvalue: Box::new(rvalue),
    }
}

fn convert(block: &Node, config: PassConfig) -> String {
    BlockConverter::new(config).convert(block).unwrap().text
}

/// int a = 5; int b = a + 2; return b;
fn simple_block() -> Node {
    Node::Block(vec![
        decl("a", num(5)),
        decl("b", bin("+", id("a"), num(2))),
        id("b"),
    ])
}

#[test]
fn simple_block_unoptimized() {
    assert_eq!(
        convert(&simple_block(), PassConfig::disabled()),
        "fun block_function(a) returns (b) =\n\tlet a = 5 in \n\tlet b = a + 2 in \n\t(b)"
    );
}

#[test]
fn simple_block_inlines_constant_but_keeps_final_binding() {
    // `a` is inlined; `b` is the final binding feeding the return and is
    // never elided.
    assert_eq!(
        convert(&simple_block(), PassConfig::default()),
        "fun block_function() returns (b) =\n\tlet b = 5 + 2 in \n\t(b)"
    );
}

#[test]
fn dead_store_is_omitted_entirely() {
    // int x = 1; int y = 2; return y;
    let block = Node::Block(vec![decl("x", num(1)), decl("y", num(2)), id("y")]);
    let text = convert(&block, PassConfig::default());
    assert_eq!(
        text,
        "fun block_function() returns (y) =\n\tlet y = 2 in \n\t(y)"
    );
    assert!(!text.contains("let x"));
}

#[test]
fn sole_single_branch_conditional_collapses_to_ternary() {
    // if (c) { a = 1; }
    let block = Node::Block(vec![Node::If {
        cond: Box::new(id("c")),
        then: Box::new(Node::Block(vec![assign(id("a"), num(1))])),
        otherwise: None,
    }]);
    assert_eq!(
        convert(&block, PassConfig::default()),
        "fun block_function(c) returns (a) =\n\tif c then (1) else (a)"
    );
}

#[test]
fn same_conditional_keeps_join_form_without_optimization() {
    let block = Node::Block(vec![Node::If {
        cond: Box::new(id("c")),
        then: Box::new(Node::Block(vec![assign(id("a"), num(1))])),
        otherwise: None,
    }]);
    assert_eq!(
        convert(&block, PassConfig::disabled()),
        "fun block_function(c) returns (a) =\n\
         \tlet (a) = if c then\n\
         \t\tlet a = 1 in \n\
         \t\t(a)\n\
         \telse\n\
         \t\t(a)\n\
         \tin (a)\n\
         \t(a)"
    );
}

#[test]
fn for_loop_between_other_statements() {
    // int sum = 0;
    // for (int i = 0; i < 3; i = i + 1) { sum = sum + i; }
    // int done = sum;
    // return done;
    let block = Node::Block(vec![
        decl("sum", num(0)),
        Node::For {
            init: Some(Box::new(decl("i", num(0)))),
            cond: Some(Box::new(bin("<", id("i"), num(3)))),
            next: Some(Box::new(assign(id("i"), bin("+", id("i"), num(1))))),
            body: Box::new(Node::Block(vec![assign(
                id("sum"),
                bin("+", id("sum"), id("i")),
            )])),
        },
        decl("done", id("sum")),
        id("done"),
    ]);
    let text = convert(&block, PassConfig::default());
    assert_eq!(
        text,
        "fun block_function(sum) returns (done) =\n\
         \tlet sum = 0 in \n\
         \tlet rec loop0(i, sum) = if i < 3 then\n\
         \t\tlet sum = sum + i in \n\
         \t\tlet i = i + 1 in \n\
         \t\tloop0(i, sum)\n\
         \telse\n\
         \t\t(i, sum)\n\
         \tin \n\
         \tlet i = 0 in \n\
         \tlet (i, sum) = loop0(i, sum) in \n\
         \tlet done = sum in \n\
         \t(done)"
    );
    // The closure threads the counter and the mutated name, and no
    // loop-internal binding was elided even with optimization on.
    assert!(text.contains("loop0(i, sum)"));
    assert!(text.contains("let sum = sum + i in "));
}

#[test]
fn while_loop_has_no_counter_or_init() {
    // while (n < 10) { n = n + 1; } return n;
    let block = Node::Block(vec![
        Node::While {
            cond: Box::new(bin("<", id("n"), num(10))),
            body: Box::new(Node::Block(vec![assign(id("n"), bin("+", id("n"), num(1)))])),
        },
        id("n"),
    ]);
    assert_eq!(
        convert(&block, PassConfig::default()),
        "fun block_function(n) returns (n) =\n\
         \tlet rec loop0(n) = if n < 10 then\n\
         \t\tlet n = n + 1 in \n\
         \t\tloop0(n)\n\
         \telse\n\
         \t\t(n)\n\
         \tin \n\
         \tlet (n) = loop0(n) in \n\
         \t(n)"
    );
}

#[test]
fn nested_loops_get_distinct_function_names() {
    // for (int i = 0; i < 2; i = i + 1)
    //     for (int j = 0; j < 2; j = j + 1)
    //         total = total + 1;
    let inner = Node::For {
        init: Some(Box::new(decl("j", num(0)))),
        cond: Some(Box::new(bin("<", id("j"), num(2)))),
        next: Some(Box::new(assign(id("j"), bin("+", id("j"), num(1))))),
        body: Box::new(Node::Block(vec![assign(
            id("total"),
            bin("+", id("total"), num(1)),
        )])),
    };
    let block = Node::Block(vec![
        decl("total", num(0)),
        Node::For {
            init: Some(Box::new(decl("i", num(0)))),
            cond: Some(Box::new(bin("<", id("i"), num(2)))),
            next: Some(Box::new(assign(id("i"), bin("+", id("i"), num(1))))),
            body: Box::new(Node::Block(vec![inner])),
        },
        id("total"),
    ]);
    let text = convert(&block, PassConfig::default());
    assert!(text.contains("let rec loop0(i, total) = "));
    assert!(text.contains("let rec loop1(j, total) = "));
    assert!(text.contains("let (j, total) = loop1(j, total) in "));
    assert!(text.contains("let (i, total) = loop0(i, total) in "));
}

#[test]
fn redeclared_then_unused_store_flows_into_output_tuple() {
    // int x = 1; int y = x + 1; x = 5; int z = y; return z, x;
    // The second store to x is dead; its value reaches the output tuple
    // directly instead of a binding line.
    let block = Node::Block(vec![
        decl("x", num(1)),
        decl("y", bin("+", id("x"), num(1))),
        assign(id("x"), num(5)),
        decl("z", id("y")),
        Node::ExprList(vec![id("z"), id("x")]),
    ]);
    assert_eq!(
        convert(&block, PassConfig::default()),
        "fun block_function(x, y) returns (z, x) =\n\
         \tlet x = 1 in \n\
         \tlet y = x + 1 in \n\
         \tlet z = y in \n\
         \t(z, 5)"
    );
}

#[test]
fn else_branch_constant_stays_inside_its_branch() {
    // if (c) { a = 1; } else { a = 2; } int b = a; return b;
    // The else branch's literal is inlined into the branch tuple only; the
    // later read of `a` must stay a name — its runtime value depends on c.
    let block = Node::Block(vec![
        Node::If {
            cond: Box::new(id("c")),
            then: Box::new(Node::Block(vec![assign(id("a"), num(1))])),
            otherwise: Some(Box::new(Node::Block(vec![assign(id("a"), num(2))]))),
        },
        decl("b", id("a")),
        id("b"),
    ]);
    assert_eq!(
        convert(&block, PassConfig::default()),
        "fun block_function(c, a) returns (b) =\n\
         \tlet (a) = if c then\n\
         \t\tlet a = 1 in \n\
         \t\t(a)\n\
         \telse\n\
         \t\t(2)\n\
         \tin (a)\n\
         \tlet b = a in \n\
         \t(b)"
    );
}

#[test]
fn unoptimized_rendering_enumerates_every_binding() {
    // With optimization off, every declaration/assignment appears exactly
    // once as a binding line, in original order.
    let block = Node::Block(vec![
        decl("a", num(1)),
        decl("b", num(2)),
        assign(id("a"), bin("+", id("a"), id("b"))),
        id("a"),
    ]);
    let text = convert(&block, PassConfig::disabled());
    let lets: Vec<&str> = text
        .lines()
        .filter(|line| line.trim_start().starts_with("let "))
        .collect();
    assert_eq!(lets.len(), 3);
    assert!(lets[0].contains("let a = 1"));
    assert!(lets[1].contains("let b = 2"));
    assert!(lets[2].contains("let a = a + b"));
}

#[test]
fn malformed_literal_terminates_the_block() {
    let block = Node::Block(vec![decl("a", Node::Constant(json!({"bad": 1})))]);
    let result = BlockConverter::default().convert(&block);
    assert!(matches!(result, Err(CoreError::Value { .. })));
}

#[test]
fn unsupported_statement_degrades_with_diagnostic() {
    let block = Node::Block(vec![
        decl("a", num(1)),
        Node::Block(vec![decl("q", num(9))]),
        id("a"),
    ]);
    let conversion = BlockConverter::default().convert(&block).unwrap();
    assert_eq!(conversion.diagnostics.len(), 1);
    assert_eq!(conversion.diagnostics[0].construct, "Block");
    assert!(!conversion.text.contains("q"));
}

#[test]
fn json_boundary_accepts_external_parser_output() {
    let raw = r#"
    {
        "Block": [
            {"Decl": {"name": "a", "init": {"Constant": 5}}},
            {"Decl": {"name": "b", "init": {"BinaryOp": {
                "op": "+",
                "left": {"Id": "a"},
                "right": {"Constant": 2}
            }}}},
            {"Id": "b"}
        ]
    }"#;
    let node: Node = serde_json::from_str(raw).unwrap();
    assert_eq!(
        convert(&node, PassConfig::default()),
        "fun block_function() returns (b) =\n\tlet b = 5 + 2 in \n\t(b)"
    );
}

#[test]
fn translation_unit_converts_each_block_independently() {
    let unit = vec![
        Node::Block(vec![decl("a", num(5)), id("a")]),
        Node::Block(vec![decl("x", num(1)), decl("y", num(2)), id("y")]),
    ];
    let conversions = convert_program(&unit, &PassConfig::default()).unwrap();
    assert_eq!(conversions.len(), 2);
    // Cursor and substitution state reset per block: the dead store in the
    // second block is judged on its own record.
    assert_eq!(
        conversions[1].text,
        "fun block_function() returns (y) =\n\tlet y = 2 in \n\t(y)"
    );
}

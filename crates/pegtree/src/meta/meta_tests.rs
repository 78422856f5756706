use indoc::indoc;

use pegtree_core::Tree;

use super::bootstrap::bootstrap;
use super::{META_GRAMMAR, metagrammar, parse_grammar, parse_grammar_tree, reconstruct,
            render_grammar};
use crate::Error;

const CALC: &str = indoc! {r"
    Start  <- _ Expr !.

    Expr   <- Mult ((ADD @Add<:left / SUB @Sub<:left) Mult:right)*
    Mult   <- Term ((MUL @Mul<:left / DIV @Div<:left) Term:right)*
    Term   <- LP Expr RP / Number

    Number <- @Number '-'? [0-9]+ _

    ADD    <- '+'~ _
    SUB    <- '-'~ _
    MUL    <- '*'~ _
    DIV    <- '/'~ _
    LP     <- '('~ _
    RP     <- ')'~ _
    _      <- ([ \t\r\n]*)~
"};

/// Tree-walking evaluator over the calculator's AST.
fn eval(tree: &Tree) -> i64 {
    let binary = |tree: &Tree| {
        let left = tree.get("left").map(eval);
        let right = tree.get("right").map(eval);
        (left.unwrap_or(0), right.unwrap_or(0))
    };
    match tree.name() {
        "Add" => {
            let (left, right) = binary(tree);
            left + right
        }
        "Sub" => {
            let (left, right) = binary(tree);
            left - right
        }
        "Mul" => {
            let (left, right) = binary(tree);
            left * right
        }
        "Div" => {
            let (left, right) = binary(tree);
            left / right
        }
        "Number" => tree.value().and_then(|v| v.parse().ok()).unwrap_or(0),
        other => panic!("unexpected node `{other}`"),
    }
}

#[test]
fn bootstrap_parses_the_metagrammar() {
    let boot = bootstrap();
    let (tree, rest) = boot.parse(META_GRAMMAR).unwrap();
    let tree = tree.expect("metagrammar text parses");
    assert_eq!(rest, "");
    assert_eq!(tree.name(), "Grammar");
    assert!(!tree.values("rule").is_empty());
}

#[test]
fn metagrammar_round_trips_through_itself() {
    // Hand-wired bootstrap and AST-reconstructed parser produce identical
    // trees over the metagrammar's own source.
    let boot = bootstrap();
    let (first, rest) = boot.parse(META_GRAMMAR).unwrap();
    let first = first.unwrap();
    assert_eq!(rest, "");

    let rebuilt = reconstruct(&first).unwrap();
    let (second, rest) = rebuilt.parse(META_GRAMMAR).unwrap();
    assert_eq!(rest, "");
    assert_eq!(first, second.unwrap());
}

#[test]
fn tagged_number_grammar() {
    let parser = parse_grammar("S <- @Num [0-9]+ @Num<<").unwrap();
    let (tree, rest) = parser.parse("42").unwrap();
    assert_eq!(tree.unwrap().to_string(), r#"Num("42")"#);
    assert_eq!(rest, "");

    let (tree, rest) = parser.parse("x").unwrap();
    assert!(tree.is_none());
    assert_eq!(rest, "x");
}

#[test]
fn arithmetic_builds_left_associated_trees() {
    let parser = parse_grammar(CALC).unwrap();

    let (tree, rest) = parser.parse("2 + 2 * 2").unwrap();
    assert_eq!(rest, "");
    let tree = tree.unwrap();
    assert_eq!(
        tree.to_string(),
        r#"Add(left=Number("2"), right=Mul(left=Number("2"), right=Number("2")))"#
    );
    assert_eq!(eval(&tree), 6);

    let (tree, rest) = parser.parse("(2 + 2) * 2").unwrap();
    assert_eq!(rest, "");
    let tree = tree.unwrap();
    assert_eq!(
        tree.to_string(),
        r#"Mul(left=Add(left=Number("2"), right=Number("2")), right=Number("2"))"#
    );
    assert_eq!(eval(&tree), 8);

    // Left association: 8 - 4 - 2 is (8 - 4) - 2.
    let (tree, _) = parser.parse("8 - 4 - 2").unwrap();
    assert_eq!(eval(&tree.unwrap()), 2);
}

#[test]
fn repeated_labels_accumulate_in_order() {
    let parser = parse_grammar("L <- @List (@Item 'a'):item*").unwrap();
    let (tree, rest) = parser.parse("aaa").unwrap();
    assert_eq!(rest, "");
    let tree = tree.unwrap();
    assert_eq!(tree.name(), "List");
    let items = tree.values("item");
    assert_eq!(items.len(), 3);
    for item in items {
        assert_eq!(item.name(), "Item");
        assert_eq!(item.value(), Some("a"));
    }
}

#[test]
fn unconsumed_input_is_returned() {
    let parser = parse_grammar("S <- @S 'a'").unwrap();
    let (tree, rest) = parser.parse("ab").unwrap();
    assert!(tree.is_some());
    assert_eq!(rest, "b");
}

#[test]
fn ordered_choice_in_surface_syntax() {
    let parser = parse_grammar("S <- @S ('a' / 'ab')").unwrap();
    let (tree, rest) = parser.parse("ab").unwrap();
    assert_eq!(tree.unwrap().to_string(), r#"S("a")"#);
    assert_eq!(rest, "b");
}

#[test]
fn escapes_and_classes() {
    let parser = parse_grammar(r"S <- @S ('\t' / '\n' / [\[\]] / [0-7] / '\101')+").unwrap();
    let (tree, rest) = parser.parse("\t\n[]7A").unwrap();
    assert_eq!(rest, "");
    assert_eq!(tree.unwrap().value(), Some("\t\n[]7A"));
}

#[test]
fn comments_and_whitespace_are_elided() {
    let parser = parse_grammar(indoc! {"
        # leading comment
        S <- @S 'a'   # trailing comment
    "})
    .unwrap();
    let (tree, _) = parser.parse("a").unwrap();
    assert!(tree.is_some());
}

#[test]
fn unparseable_grammar_text_is_a_syntax_error() {
    assert_eq!(parse_grammar("not a grammar at all!").unwrap_err(), Error::Syntax);
    // A well-formed prefix followed by garbage fails too: the whole input
    // must be consumed.
    assert_eq!(parse_grammar("S <- 'a' ;;;").unwrap_err(), Error::Syntax);
}

#[test]
fn invalid_grammars_are_rejected_by_parse_grammar() {
    assert_eq!(
        parse_grammar("X <- Z").unwrap_err(),
        Error::Undefined(vec!["Z".into()])
    );
    assert_eq!(
        parse_grammar("X <- X").unwrap_err(),
        Error::NotWellFormed(vec!["X".into()])
    );
}

#[test]
fn rendered_grammar_reparses_to_the_same_behaviour() {
    let tree = parse_grammar_tree(CALC).unwrap();
    let rendered = render_grammar(&tree).unwrap();
    let reparsed = parse_grammar(&rendered).unwrap();
    let original = parse_grammar(CALC).unwrap();

    for input in ["2 + 2 * 2", "(2 + 2) * 2", "1 - -1", "oops"] {
        let (a, rest_a) = original.parse(input).unwrap();
        let (b, rest_b) = reparsed.parse(input).unwrap();
        assert_eq!(a, b, "on {input:?}");
        assert_eq!(rest_a, rest_b);
    }

    // Rendering the reparse of a rendering is a fixed point.
    let again = render_grammar(&parse_grammar_tree(&rendered).unwrap()).unwrap();
    assert_eq!(rendered, again);
}

#[test]
fn empty_alternatives_render() {
    let tree = parse_grammar_tree("A <- @A ('x' /)").unwrap();
    let rendered = render_grammar(&tree).unwrap();
    let reparsed = parse_grammar(&rendered).unwrap();
    // The empty second alternative accepts anything, consuming nothing.
    let (tree, rest) = reparsed.parse("y").unwrap();
    assert_eq!(tree.unwrap().to_string(), "A");
    assert_eq!(rest, "y");
}

#[test]
fn rendered_metagrammar_still_parses_grammars() {
    let tree = parse_grammar_tree(META_GRAMMAR).unwrap();
    let rendered = render_grammar(&tree).unwrap();
    let rebuilt_meta = parse_grammar(&rendered).unwrap();

    let (a, rest_a) = metagrammar().parse(CALC).unwrap();
    let (b, rest_b) = rebuilt_meta.parse(CALC).unwrap();
    assert_eq!(rest_a, "");
    assert_eq!(rest_b, "");
    assert_eq!(a.unwrap(), b.unwrap());
}

use pegtree_core::Fragment;

use super::Expr;
use crate::grammar::Grammar;
use crate::Error;

fn lit(text: &str) -> Expr {
    Expr::lit(text)
}

fn r(name: &str) -> Expr {
    Expr::rule(name)
}

fn apply<'a>(expr: &Expr, input: &'a str) -> Option<(Fragment, &'a str)> {
    expr.apply(&Grammar::new(), input, &Fragment::Empty).unwrap()
}

#[test]
fn primitives() {
    let (frag, rest) = apply(&Expr::Any, "ab").unwrap();
    assert_eq!(frag, Fragment::String("a".into()));
    assert_eq!(rest, "b");
    assert!(apply(&Expr::Any, "").is_none());

    assert!(apply(&lit("ab"), "abc").is_some());
    assert!(apply(&lit("ab"), "ac").is_none());

    let (frag, rest) = apply(&Expr::range('0', '9'), "42").unwrap();
    assert_eq!(frag, Fragment::String("4".into()));
    assert_eq!(rest, "2");
    assert!(apply(&Expr::range('0', '9'), "x").is_none());

    assert!(apply(&Expr::one_of("+-"), "-1").is_some());
    assert!(apply(&Expr::one_of("+-"), "*1").is_none());

    let (frag, rest) = apply(&Expr::Epsilon, "x").unwrap();
    assert_eq!(frag, Fragment::Empty);
    assert_eq!(rest, "x");

    assert!(apply(&Expr::Nothing, "x").is_none());
}

#[test]
fn tag_replaces_the_fragment() {
    let expr = lit("x") * Expr::tag("X");
    let (frag, rest) = apply(&expr, "x").unwrap();
    assert_eq!(frag, Fragment::Named("X".into()));
    assert_eq!(rest, "");
}

#[test]
fn choice_is_ordered() {
    // PEG ordered choice: once "a" matches, "ab" is never reconsidered.
    let expr = Expr::tag("T") * (lit("a") | lit("ab"));
    let (frag, rest) = apply(&expr, "ab").unwrap();
    assert_eq!(
        frag,
        Fragment::Term {
            name: "T".into(),
            value: "a".into(),
        }
    );
    assert_eq!(rest, "b");
}

#[test]
fn failure_leaves_input_untouched() {
    let expr = lit("ab") * lit("cd");
    let input = "abxx";
    assert!(apply(&expr, input).is_none());

    // The failed sequence consumed nothing as far as callers can tell.
    let recover = lit("abx");
    let (_, rest) = apply(&recover, input).unwrap();
    assert_eq!(rest, "x");
}

#[test]
fn repetition_is_greedy() {
    let digits = Expr::tag("Num") * Expr::range('0', '9').rep1();
    let (frag, rest) = apply(&digits, "123x").unwrap();
    assert_eq!(
        frag,
        Fragment::Term {
            name: "Num".into(),
            value: "123".into(),
        }
    );
    assert_eq!(rest, "x");

    assert!(apply(&digits, "x").is_none());

    // Zero-or-more succeeds on no match at all.
    let star = Expr::range('0', '9').rep();
    let (frag, rest) = apply(&star, "x").unwrap();
    assert_eq!(frag, Fragment::Empty);
    assert_eq!(rest, "x");
}

#[test]
fn lookahead_consumes_nothing() {
    let and = lit("a").ahead();
    let (frag, rest) = apply(&and, "ab").unwrap();
    assert_eq!(frag, Fragment::Empty);
    assert_eq!(rest, "ab");
    assert!(apply(&and, "b").is_none());

    let not = !lit("a");
    assert!(apply(&not, "ab").is_none());
    let (frag, rest) = apply(&not, "ba").unwrap();
    assert_eq!(frag, Fragment::Empty);
    assert_eq!(rest, "ba");
}

#[test]
fn ignore_advances_without_building() {
    let expr = Expr::tag("T") * lit("skip").ign() * lit("x");
    let (frag, rest) = apply(&expr, "skipx").unwrap();
    assert_eq!(
        frag,
        Fragment::Term {
            name: "T".into(),
            value: "x".into(),
        }
    );
    assert_eq!(rest, "");
}

#[test]
fn tagged_number_parses_to_a_term() {
    // S <- @Num [0-9]+ @Num<<
    let expr = Expr::tag("Num") * Expr::range('0', '9').rep1() * Expr::tag("Num").rext();
    let (tree, rest) = expr.parse("42").unwrap();
    assert_eq!(tree.unwrap().to_string(), r#"Num("42")"#);
    assert_eq!(rest, "");

    let (tree, rest) = expr.parse("x").unwrap();
    assert!(tree.is_none());
    assert_eq!(rest, "x");
}

#[test]
fn rappend_folds_left() {
    let mut g = Grammar::new();
    g.define(
        "Expr",
        r("Num")
            * ((lit("+").ign() * Expr::tag("Add")).rapp("left") * r("Num").app("right")).rep(),
    );
    g.define("Num", Expr::tag("Num") * Expr::range('0', '9').rep1());
    let parser = g.into_parser("Expr");

    let (tree, rest) = parser.parse("1+2+3").unwrap();
    assert_eq!(rest, "");
    assert_eq!(
        tree.unwrap().to_string(),
        r#"Add(left=Add(left=Num("1"), right=Num("2")), right=Num("3"))"#
    );
}

#[test]
fn rules_resolve_lazily_and_recursively() {
    // Parenthesis nesting: defined before "Inner" exists.
    let mut g = Grammar::new();
    g.define(
        "Parens",
        lit("(").ign() * (r("Parens") | r("Inner")) * lit(")").ign(),
    );
    g.define("Inner", Expr::tag("Core") * lit("x"));
    let parser = g.into_parser("Parens");

    let (tree, rest) = parser.parse("((x))").unwrap();
    assert_eq!(tree.unwrap().to_string(), r#"Core("x")"#);
    assert_eq!(rest, "");
}

#[test]
fn undefined_rule_is_a_fault_not_a_failure() {
    let err = r("Ghost").parse("x").unwrap_err();
    assert_eq!(err, Error::UndefinedRule("Ghost".into()));
}

#[test]
fn direct_left_recursion_is_not_well_formed() {
    let mut g = Grammar::new();
    g.define("A", r("A"));
    assert_eq!(g.is_well_formed("A"), None);
    assert_eq!(g.ill_formed_rules(), vec!["A".to_string()]);
}

#[test]
fn guarded_recursion_is_well_formed() {
    let mut g = Grammar::new();
    g.define("A", lit("x") * r("A") | Expr::Epsilon);
    assert_eq!(g.is_nullable("A"), Some(true));
    assert_eq!(g.is_well_formed("A"), Some(true));
    assert!(g.ill_formed_rules().is_empty());
}

#[test]
fn nullable_repetition_is_not_well_formed() {
    let mut g = Grammar::new();
    g.define("A", lit("").rep());
    assert_eq!(g.is_well_formed("A"), Some(false));
    assert_eq!(g.ill_formed_rules(), vec!["A".to_string()]);
}

#[test]
fn mutual_recursion_is_not_well_formed() {
    let mut g = Grammar::new();
    g.define("X", r("Y"));
    g.define("Y", r("X"));
    assert_eq!(
        g.ill_formed_rules(),
        vec!["X".to_string(), "Y".to_string()]
    );
}

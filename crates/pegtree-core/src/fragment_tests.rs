use super::*;
use crate::tree::Tree;

fn s(text: &str) -> Fragment {
    Fragment::String(text.into())
}

fn named(name: &str) -> Fragment {
    Fragment::Named(name.into())
}

#[test]
fn empty_extend_promotes_by_content() {
    assert_eq!(Fragment::Empty.extend(&s("ab")).unwrap(), s("ab"));

    let term = Fragment::Term {
        name: "Num".into(),
        value: "4".into(),
    };
    assert_eq!(Fragment::Empty.extend(&term).unwrap(), s("4"));

    let node = Fragment::Node {
        name: "N".into(),
        children: vec![("x".into(), Tree::Named { name: "A".into() })],
    };
    assert_eq!(
        Fragment::Empty.extend(&node).unwrap(),
        Fragment::Container(vec![("x".into(), Tree::Named { name: "A".into() })])
    );

    // Content-free arguments contribute nothing.
    assert_eq!(Fragment::Empty.extend(&Fragment::Empty).unwrap(), Fragment::Empty);
    assert_eq!(Fragment::Empty.extend(&named("A")).unwrap(), Fragment::Empty);
}

#[test]
fn named_extend_promotes_to_term_or_node() {
    assert_eq!(
        named("Num").extend(&s("42")).unwrap(),
        Fragment::Term {
            name: "Num".into(),
            value: "42".into(),
        }
    );

    let container = Fragment::Container(vec![("x".into(), Tree::Named { name: "A".into() })]);
    assert_eq!(
        named("N").extend(&container).unwrap(),
        Fragment::Node {
            name: "N".into(),
            children: vec![("x".into(), Tree::Named { name: "A".into() })],
        }
    );

    assert_eq!(named("N").extend(&Fragment::Empty).unwrap(), named("N"));
}

#[test]
fn string_extend_concatenates() {
    assert_eq!(s("ab").extend(&s("cd")).unwrap(), s("abcd"));
    assert_eq!(s("ab").rextend(&s("cd")).unwrap(), s("cdab"));
}

#[test]
fn term_extend_keeps_tag() {
    let term = Fragment::Term {
        name: "Num".into(),
        value: "4".into(),
    };
    assert_eq!(
        term.extend(&s("2")).unwrap(),
        Fragment::Term {
            name: "Num".into(),
            value: "42".into(),
        }
    );
    assert_eq!(
        term.rextend(&s("2")).unwrap(),
        Fragment::Term {
            name: "Num".into(),
            value: "24".into(),
        }
    );
}

#[test]
fn container_extend_splices_children() {
    let a = Fragment::Container(vec![("x".into(), Tree::Named { name: "A".into() })]);
    let b = Fragment::Container(vec![("y".into(), Tree::Named { name: "B".into() })]);

    assert_eq!(
        a.extend(&b).unwrap(),
        Fragment::Container(vec![
            ("x".into(), Tree::Named { name: "A".into() }),
            ("y".into(), Tree::Named { name: "B".into() }),
        ])
    );
    assert_eq!(
        a.rextend(&b).unwrap(),
        Fragment::Container(vec![
            ("y".into(), Tree::Named { name: "B".into() }),
            ("x".into(), Tree::Named { name: "A".into() }),
        ])
    );
}

#[test]
fn append_builds_labelled_children() {
    let child = named("Item");

    let container = Fragment::Empty.append("item", &child).unwrap();
    assert_eq!(
        container,
        Fragment::Container(vec![("item".into(), Tree::Named { name: "Item".into() })])
    );

    let node = named("List").append("item", &child).unwrap();
    let node = node.append("item", &child).unwrap();
    assert_eq!(
        node,
        Fragment::Node {
            name: "List".into(),
            children: vec![
                ("item".into(), Tree::Named { name: "Item".into() }),
                ("item".into(), Tree::Named { name: "Item".into() }),
            ],
        }
    );
}

#[test]
fn rappend_places_child_first() {
    let first = named("A");
    let second = named("B");

    let node = named("Pair").append("x", &first).unwrap();
    let node = node.rappend("y", &second).unwrap();
    assert_eq!(
        node,
        Fragment::Node {
            name: "Pair".into(),
            children: vec![
                ("y".into(), Tree::Named { name: "B".into() }),
                ("x".into(), Tree::Named { name: "A".into() }),
            ],
        }
    );
}

#[test]
fn finalize_requires_a_tag() {
    assert_eq!(
        named("A").finalize().unwrap(),
        Tree::Named { name: "A".into() }
    );

    let err = Fragment::Empty.finalize().unwrap_err();
    assert_eq!(err.op, "finalize");
    assert_eq!(err.variant, "empty");

    assert!(s("x").finalize().is_err());
    assert!(Fragment::Container(vec![]).finalize().is_err());
}

#[test]
fn shape_errors_are_distinct_faults() {
    // A lexeme cannot take labelled children.
    let err = s("x").append("a", &named("A")).unwrap_err();
    assert_eq!(err.op, "append");
    assert_eq!(err.variant, "string");

    // Children cannot be spliced into text.
    let container = Fragment::Container(vec![]);
    assert!(s("x").extend(&container).is_err());

    // An unfinalizable child poisons the append.
    let err = named("N").append("a", &s("x")).unwrap_err();
    assert_eq!(err.op, "finalize");
}

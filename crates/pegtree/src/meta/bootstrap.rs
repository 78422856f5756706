//! Hand-wired parser for the surface syntax.
//!
//! This expression graph is built directly from combinators and recognises
//! the same language as [`META_GRAMMAR`](super::META_GRAMMAR); parsing that
//! text with this graph and rebuilding a parser from the result is what
//! makes the toolkit self-describing.

use crate::expr::Expr;
use crate::grammar::{Grammar, Parser};

pub(super) fn bootstrap() -> Parser {
    let r = |name: &str| Expr::rule(name);
    let lit = |text: &str| Expr::lit(text);
    let rng = Expr::range;
    let tag = |name: &str| Expr::tag(name);

    let mut g = Grammar::new();

    // Hierarchical syntax.
    g.define(
        "Grammar",
        tag("Grammar") * r("Spacing") * r("Definition").app("rule").rep1() * r("EndOfFile"),
    );
    g.define(
        "Definition",
        r("Identifier") * r("LEFTARROW") * tag("Rule").rapp("name") * r("Expression").app("body"),
    );
    g.define(
        "Expression",
        r("Sequence")
            * (r("SLASH") * tag("Choice").rapp("alt") * r("Sequence").app("alt")
                * (r("SLASH") * r("Sequence").app("alt")).rep())
            .opt(),
    );
    g.define(
        "Sequence",
        r("Prefix")
            * (tag("Sequence").rapp("item") * r("Prefix").app("item")
                * r("Prefix").app("item").rep())
            .opt()
            | tag("Epsilon"),
    );
    g.define(
        "Prefix",
        (r("AND") * tag("And") | r("NOT") * tag("Not")) * r("Suffix").app("expr") | r("Suffix"),
    );
    g.define(
        "Suffix",
        r("AstOp")
            * (r("QUESTION") * tag("Optional")
                | r("STAR") * tag("Repeat")
                | r("PLUS") * tag("Repeat1"))
            .rapp("expr")
            .opt(),
    );
    g.define(
        "AstOp",
        r("Primary")
            * ((r("LAPPEND") * tag("Append") | r("RAPPEND") * tag("Rappend")).rapp("expr")
                * r("TreeIdent").app("name")
                | (r("LEXTEND") * tag("Extend")
                    | r("REXTEND") * tag("Rextend")
                    | r("IGNORE") * tag("Ignore"))
                .rapp("expr"))
            .opt(),
    );
    g.define(
        "Primary",
        r("Identifier") * !r("LEFTARROW")
            | r("OPEN") * r("Expression") * r("CLOSE")
            | r("Literal")
            | r("Class")
            | r("Any")
            | r("Tag"),
    );

    // Lexical syntax.
    g.define(
        "Identifier",
        r("IdentStart") * r("IdentCont").rep() * tag("Identifier").rext() * r("Spacing"),
    );
    g.define(
        "TreeIdent",
        r("IdentStart") * r("IdentCont").rep() * tag("TreeIdent").rext() * r("Spacing"),
    );
    g.define(
        "Tag",
        lit("@").ign() * r("IdentStart") * r("IdentCont").rep() * tag("Tag").rext() * r("Spacing"),
    );
    g.define(
        "IdentStart",
        rng('a', 'z') | rng('A', 'Z') | lit("_"),
    );
    g.define("IdentCont", r("IdentStart") | rng('0', '9'));

    g.define(
        "Literal",
        lit("'").ign() * tag("Literal") * (!lit("'") * r("Char").app("char")).rep()
            * lit("'").ign()
            * r("Spacing")
            | lit("\"").ign() * tag("Literal") * (!lit("\"") * r("Char").app("char")).rep()
                * lit("\"").ign()
                * r("Spacing"),
    );
    g.define(
        "Class",
        lit("[").ign()
            * (!lit("]") * r("Range")
                * (!lit("]") * tag("Class").rapp("item") * r("Range").app("item")
                    * (!lit("]") * r("Range").app("item")).rep())
                .opt()
                | tag("Nothing"))
            * lit("]").ign()
            * r("Spacing"),
    );
    g.define(
        "Range",
        r("Char") * lit("-").ign() * tag("Range").rapp("start") * r("Char").app("end")
            | r("Char") * tag("Char").rapp("char"),
    );
    g.define(
        "Char",
        lit("\\").ign()
            * (lit("n")
                | lit("r")
                | lit("t")
                | lit("'")
                | lit("\"")
                | lit("[")
                | lit("]")
                | lit("\\"))
            * tag("escape").rext()
            | lit("\\").ign() * rng('0', '2') * rng('0', '7') * rng('0', '7') * tag("octal").rext()
            | lit("\\").ign() * rng('0', '7') * rng('0', '7').opt() * tag("octal").rext()
            | !lit("\\") * Expr::Any * tag("char").rext(),
    );
    g.define("Any", r("DOT") * tag("Any"));

    g.define("LEFTARROW", lit("<-").ign() * r("Spacing"));
    g.define("SLASH", lit("/").ign() * r("Spacing"));
    g.define("AND", lit("&").ign() * r("Spacing"));
    g.define("NOT", lit("!").ign() * r("Spacing"));
    g.define("QUESTION", lit("?").ign() * r("Spacing"));
    g.define("STAR", lit("*").ign() * r("Spacing"));
    g.define("PLUS", lit("+").ign() * r("Spacing"));
    g.define("OPEN", lit("(").ign() * r("Spacing"));
    g.define("CLOSE", lit(")").ign() * r("Spacing"));
    g.define("DOT", lit(".").ign() * r("Spacing"));
    g.define("LEXTEND", lit(">>").ign() * r("Spacing"));
    g.define("REXTEND", lit("<<").ign() * r("Spacing"));
    g.define("LAPPEND", lit(":").ign() * r("Spacing"));
    g.define("RAPPEND", lit("<:").ign() * r("Spacing"));
    g.define("IGNORE", lit("~").ign() * r("Spacing"));

    g.define("Spacing", (r("Space") | r("Comment")).rep());
    g.define(
        "Comment",
        lit("#").ign() * (!r("EndOfLine") * Expr::Any.ign()).rep() * r("EndOfLine"),
    );
    g.define("Space", lit(" ").ign() | lit("\t").ign() | r("EndOfLine"));
    g.define(
        "EndOfLine",
        lit("\r\n").ign() | lit("\n").ign() | lit("\r").ign(),
    );
    g.define("EndOfFile", !Expr::Any);

    g.into_parser("Grammar")
}

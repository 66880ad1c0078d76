//! Course-stack semantics: opening a leveled section implicitly closes
//! every open section at that level or deeper, firing close hooks, and
//! leaves shallower sections open.

use cyc_parser::cyc::parsing::parse;
use cyc_render::engine::render;
use cyc_render::rules::{CloseHook, Rule, Rules, Transform};

fn leveled(level: i64, open: &str, close: &str) -> Rule {
    let close = close.to_string();
    Rule::new()
        .level(level)
        .on("gen", Transform::wrap(format!("[{}:", open), "]"))
        .on_close(
            "gen",
            CloseHook::Run(Box::new(move |acc| format!("{}[/{}]", acc, close))),
        )
}

fn sectioning_rules() -> Rules {
    Rules::new(&["gen"])
        .rule("", Rule::new())
        .rule("book", leveled(1, "book", "book"))
        .rule("chapter", leveled(2, "chapter", "chapter"))
        .rule("section", leveled(3, "section", "section"))
}

fn gen(text: &str) -> String {
    let rules = sectioning_rules();
    let form = parse(text, &rules).unwrap();
    render(&form, &rules).unwrap().remove("gen").unwrap()
}

#[test]
fn sibling_section_closes_deeper_ones_only() {
    // The second chapter closes the open section and the first chapter,
    // but not the book.
    let text = "@book(B)\n@chapter(C1)\n@section(S1)\n@chapter(C2)\nend";
    assert_eq!(
        gen(text),
        "[book:B][chapter:C1][section:S1][/section][/chapter][chapter:C2]end[/chapter][/book]"
    );
}

#[test]
fn level_one_closes_everything_open() {
    let text = "@book(A)\n@chapter(C)\n@book(B)";
    assert_eq!(
        gen(text),
        "[book:A][chapter:C][/chapter][/book][book:B][/book]"
    );
}

#[test]
fn document_end_flushes_all_open_sections() {
    assert_eq!(
        gen("@book(A)\n@chapter(C)"),
        "[book:A][chapter:C][/chapter][/book]"
    );
}

#[test]
fn literal_close_hook_replaces_the_pending_text() {
    let rules = Rules::new(&["gen"])
        .rule("", Rule::new())
        .rule(
            "part",
            Rule::new()
                .level(1)
                .on("gen", Transform::wrap("[part:", "]"))
                .on_close("gen", CloseHook::Literal("<hr>".to_string())),
        );
    let form = parse("@part(one)\n@part(two)", &rules).unwrap();
    let output = render(&form, &rules).unwrap().remove("gen").unwrap();
    assert_eq!(output, "[part:one]<hr>[part:two]<hr>");
}

#[test]
fn paragraph_pending_before_leveled_child_is_flushed_first() {
    let rules = Rules::new(&["gen"])
        .rule("", Rule::new().on("gen", Transform::wrap("<p>", "</p>")))
        .rule("chapter", leveled(2, "chapter", "chapter"));
    let form = parse("intro text\n@chapter(C)", &rules).unwrap();
    let output = render(&form, &rules).unwrap().remove("gen").unwrap();
    // The pending paragraph flushes before the chapter opens; the empty
    // trailing accumulator still goes through the paragraph rule, and the
    // chapter's close hook fires last, at end of document.
    assert_eq!(output, "<p>intro text</p>[chapter:C]<p></p>[/chapter]");
}

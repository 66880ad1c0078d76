//! Integration tests for the structure parser: nesting, sections, and
//! the error taxonomy across whole inputs.

use cyc_parser::cyc::ast::Item;
use cyc_parser::cyc::parsing::{parse, ParseError};
use cyc_parser::cyc::testing::TestTags;
use rstest::rstest;

fn book_tags() -> TestTags {
    TestTags::new(&["b", "i", "t", "link", "table", "program"])
        .with_level("book", 1)
        .with_level("chapter", 2)
        .with_level("section", 5)
}

#[test]
fn nested_tags_build_a_tree() {
    let form = parse("@b(one @i(two) three)", &book_tags()).unwrap();
    let b = match &form.lines[0].items[0] {
        Item::Form(b) => b,
        other => panic!("expected form, got {:?}", other),
    };
    assert_eq!(b.name, "b");
    let items = &b.lines[0].items;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Item::Text("one ".into()));
    match &items[1] {
        Item::Form(i) => assert_eq!(i.single_text(), Some("two")),
        other => panic!("expected form, got {:?}", other),
    }
    assert_eq!(items[2], Item::Text(" three".into()));
}

#[test]
fn multi_line_section_content() {
    let text = "@begin(chapter)\nfirst line\n\nsecond para\n@end(chapter)";
    let form = parse(text, &book_tags()).unwrap();
    let chapter = match &form.lines[0].items[0] {
        Item::Form(chapter) => chapter,
        other => panic!("expected form, got {:?}", other),
    };
    assert_eq!(chapter.name, "chapter");
    // one empty opening line, content lines, and the line the @end started on
    assert!(chapter.lines.len() >= 4);
}

#[test]
fn begin_end_section_equals_direct_tag() {
    let tags = book_tags();
    let direct = parse("@chapter(Intro)", &tags).unwrap();
    let bracketed = parse("@begin(chapter)Intro@end(chapter)", &tags).unwrap();
    assert_eq!(direct, bracketed);
}

#[test]
fn quoted_delimiters_nest_inside_bracketed() {
    let form = parse("@b\"it's (fine)\"", &book_tags()).unwrap();
    let b = match &form.lines[0].items[0] {
        Item::Form(b) => b,
        other => panic!("expected form, got {:?}", other),
    };
    assert_eq!(b.single_text(), Some("it's (fine)"));
}

#[rstest]
#[case::unknown_name("@nope(x)")]
#[case::unterminated("@b(bold text")]
#[case::unterminated_section("@begin(b)text")]
#[case::mismatched_end("@begin(b)text@end(i)")]
#[case::stray_end("@end(b)")]
#[case::nested_leveled("@b(@chapter(x))")]
#[case::nested_leveled_begin("@b(@begin(chapter)")]
#[case::directive_in_begin_body("@begin(a@|b)")]
fn error_inputs_fail(#[case] text: &str) {
    assert!(parse(text, &book_tags()).is_err(), "should fail: {}", text);
}

#[rstest]
#[case("@b(bold text", ParseError::UnterminatedDelimiter { closer: ')', name: "b".into() })]
#[case("@b[bold text", ParseError::UnterminatedDelimiter { closer: ']', name: "b".into() })]
#[case("@b{bold text", ParseError::UnterminatedDelimiter { closer: '}', name: "b".into() })]
fn unterminated_reports_the_expected_closer(#[case] text: &str, #[case] expected: ParseError) {
    assert_eq!(parse(text, &book_tags()).unwrap_err(), expected);
}

#[test]
fn escaping_survives_nesting() {
    let form = parse("@b(a@@b)", &book_tags()).unwrap();
    let b = match &form.lines[0].items[0] {
        Item::Form(b) => b,
        other => panic!("expected form, got {:?}", other),
    };
    assert_eq!(b.single_text(), Some("a@b"));
}

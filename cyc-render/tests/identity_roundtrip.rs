//! Round-trip property: with an identity-style rule module (no text
//! encoder, pass-through tag rules), rendering a parse reproduces the
//! input modulo normalized line breaks and `@@` unescaping.

use cyc_parser::cyc::parsing::parse;
use cyc_render::engine::render;
use cyc_render::rules::{Rule, Rules};
use proptest::prelude::*;

fn identity_rules() -> Rules {
    Rules::new(&["gen"])
        .rule("", Rule::new())
        .rule("b", Rule::new())
        .rule("i", Rule::new())
}

fn gen(text: &str) -> String {
    let rules = identity_rules();
    let form = parse(text, &rules).unwrap();
    render(&form, &rules).unwrap().remove("gen").unwrap()
}

proptest! {
    #[test]
    fn plain_lines_round_trip(lines in proptest::collection::vec("[a-z][a-z ]*", 1..5)) {
        let text = lines.join("\n");
        prop_assert_eq!(gen(&text), text);
    }

    #[test]
    fn passthrough_tag_yields_its_content(inner in "[a-z][a-z ]*") {
        let wrapped = format!("@b({})", inner);
        prop_assert_eq!(gen(&wrapped), inner);
    }

    #[test]
    fn escaped_at_unescapes(s in "[a-z]+") {
        let text = format!("{0}@@{0}", s);
        prop_assert_eq!(gen(&text), format!("{0}@{0}", s));
    }

    #[test]
    fn begin_end_renders_like_the_direct_tag(inner in "[a-z][a-z ]*") {
        let direct = gen(&format!("@b({})", inner));
        let bracketed = gen(&format!("@begin(b){}@end(b)", inner));
        prop_assert_eq!(direct, bracketed);
    }

    #[test]
    fn crlf_normalizes_to_lf(lines in proptest::collection::vec("[a-z]+", 2..4)) {
        let crlf = lines.join("\r\n");
        let lf = lines.join("\n");
        prop_assert_eq!(gen(&crlf), gen(&lf));
    }
}

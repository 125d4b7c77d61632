//! Structural change detection against the session snapshot

use rstest::rstest;
use sketch_live::live::{LiveError, LiveSession};

fn changed(previous: &str, current: &str) -> bool {
    let mut session = LiveSession::default();
    session.extract(previous).expect("previous extracts");
    session
        .has_structural_change(current)
        .expect("current parses")
}

#[rstest]
#[case::identical("let a = 1;", "let a = 1;")]
#[case::reformatted("let a = 1; console.log(a);", "let a = 1;\n\n   console.log(a);")]
#[case::literal_values("let a = 1;\nconsole.log('a');", "let a = 11;\nconsole.log('b');")]
#[case::comments_added("let a = 1;", "// speed\nlet a = /* px */ 1;")]
#[case::literal_kind("fill(255);", "fill('red');")]
#[case::optional_semicolons("let a = 1\nf(a)", "let a = 1;\nf(a);")]
#[case::redundant_parentheses("x = (a * b) + c;", "x = a * b + c;")]
fn literal_only_edits(#[case] previous: &str, #[case] current: &str) {
    assert!(!changed(previous, current));
}

#[rstest]
#[case::renamed_declaration("let a = 1;", "let b = 1;")]
#[case::argument_added("console.log('a');", "console.log('a', 'b');")]
#[case::argument_removed("rect(1, 2, 3, 4);", "rect(1, 2, 3);")]
#[case::declaration_added("let a = 1;", "let a = 1;\nlet b = 2;")]
#[case::declaration_removed("let a = 1;\nlet b = 2;", "let b = 2;")]
#[case::operator_changed("x = a + 1;", "x = a * 1;")]
#[case::literal_became_identifier("fill(255);", "fill(c);")]
#[case::callee_renamed("rect(1, 2);", "ellipse(1, 2);")]
#[case::grouping_changed("x = (a + b) * c;", "x = a + b * c;")]
#[case::emptied("let a = 1;", "")]
fn structural_edits(#[case] previous: &str, #[case] current: &str) {
    assert!(changed(previous, current));
}

#[test]
fn differ_requires_a_snapshot() {
    let session = LiveSession::default();
    assert_eq!(
        session.has_structural_change("let a = 1;"),
        Err(LiveError::NoSnapshot)
    );
}

#[test]
fn unparseable_input_is_an_error_not_a_verdict() {
    let mut session = LiveSession::default();
    session.extract("let a = 1;").expect("extract");
    assert!(matches!(
        session.has_structural_change("let a = (1;"),
        Err(LiveError::Parse(_))
    ));
}

#[test]
fn comparison_is_against_the_latest_extraction() {
    let mut session = LiveSession::default();
    session.extract("let a = 1;").expect("extract");
    session.extract("let b = 1;").expect("extract");
    assert!(!session.has_structural_change("let b = 2;").expect("parses"));
    assert!(session.has_structural_change("let a = 2;").expect("parses"));
}

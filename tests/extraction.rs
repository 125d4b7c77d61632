//! Literal extraction through the public session API

use rstest::rstest;
use serde_json::{json, Value};
use sketch_live::live::ast::{Expression, MemberProperty, Program, Statement};
use sketch_live::live::extraction::{derive_key, KeyContext};
use sketch_live::live::formats::{print_program, PrintOptions};
use sketch_live::live::parsing::normalize;
use sketch_live::live::{ExtractOutcome, Extraction, LiveSession};

fn fresh(source: &str) -> Extraction {
    match LiveSession::default().extract(source) {
        Ok(ExtractOutcome::Fresh(extraction)) => extraction,
        other => panic!("expected a fresh extraction of {:?}, got {:?}", source, other),
    }
}

fn declarator(name: &str, line: usize) -> String {
    derive_key("a", &KeyContext::Declarator { name, line })
}

fn argument(raw: &str, index: usize, line: usize) -> String {
    derive_key("a", &KeyContext::Argument { raw, index, line })
}

#[test]
fn single_declaration() {
    let extraction = fresh("let a = 1;");
    let key = declarator("a", 1);

    let entries: Vec<(&str, &Value)> = extraction.vars.iter().collect();
    assert_eq!(entries, vec![(key.as_str(), &json!(1))]);

    let printed = print_program(&extraction.program, &PrintOptions::default());
    assert_eq!(printed, format!("let a = __AllVars.{};\n", key));
}

#[test]
fn equal_values_in_different_declarations_get_different_keys() {
    let extraction = fresh("const a = 1; const b = 1;");
    let keys: Vec<&str> = extraction.vars.keys().collect();
    // Normalization puts the declarations on lines 1 and 2
    assert_eq!(keys, vec![declarator("a", 1), declarator("b", 2)]);
}

#[test]
fn identical_call_arguments_are_disambiguated() {
    let extraction = fresh("m(1, 1);");
    let base = argument("1", 0, 1);
    let keys: Vec<&str> = extraction.vars.keys().collect();
    assert_eq!(keys, vec![base.clone(), format!("{}_1", base)]);
}

#[rstest]
#[case::single_line("m(1, 1);")]
#[case::split_lines("m(1,\n1);")]
#[case::tabs("m(1,\n\t\t1);")]
fn argument_keys_ignore_layout(#[case] source: &str) {
    let base = argument("1", 0, 1);
    let keys: Vec<String> = fresh(source).vars.keys().map(str::to_string).collect();
    assert_eq!(keys, vec![base.clone(), format!("{}_1", base)]);
}

#[rstest]
#[case::nested_other_callee("m(1, m2(1));")]
#[case::nested_same_callee("m(1, m(1));")]
fn nested_call_arguments_share_a_context(#[case] source: &str) {
    let base = argument("1", 0, 1);
    let keys: Vec<String> = fresh(source).vars.keys().map(str::to_string).collect();
    assert_eq!(keys, vec![base.clone(), format!("{}_1", base)]);
}

#[rstest]
#[case("let a = 1;", 1)]
#[case("let a = 1; let b = 'two'; let c = true; let d = null;", 4)]
#[case("function draw() { background(220); ellipse(50, 50, 80, 80); }", 5)]
#[case("let v = -1;", 1)]
#[case("let nothing;", 0)]
#[case("", 0)]
fn counts_every_literal(#[case] source: &str, #[case] expected: usize) {
    assert_eq!(fresh(source).vars.len(), expected);
}

#[test]
fn keys_survive_edits_elsewhere() {
    let before = fresh("let speed = 2;\nlet size = 10;");
    let after = fresh("let speed = 5;\nlet size = 10;");
    let before_keys: Vec<&str> = before.vars.keys().collect();
    let after_keys: Vec<&str> = after.vars.keys().collect();
    assert_eq!(before_keys, after_keys);
    assert_eq!(after.vars.get(&declarator("speed", 1)), Some(&json!(5)));
}

#[test]
fn rendered_output_declares_the_table() {
    let mut session = LiveSession::default();
    let outcome = session.extract("let a = 1;").expect("extract");
    let rendered = session.render(outcome.extraction());
    let key = declarator("a", 1);
    assert_eq!(
        rendered,
        format!(
            "const __AllVars = {{\"{key}\":1}}; let a = __AllVars.{key};\n",
            key = key
        )
    );
}

#[test]
fn re_extracting_rewritten_program_keeps_keys() {
    let source = "let a = 1;\nm(2, 'x');\nif (a) { f([3]); }";
    let first = fresh(source);
    let rewritten = print_program(&first.program, &PrintOptions::default());

    // Inline the table values again and extract once more
    let program = normalize(&rewritten, &PrintOptions::default()).expect("reparse");
    let restored = inline_table(&program, &first);
    let second = fresh(&restored);

    let first_keys: Vec<&str> = first.vars.keys().collect();
    let second_keys: Vec<&str> = second.vars.keys().collect();
    assert_eq!(first_keys, second_keys);
}

/// Rewritten declarations, with the table applied, hold the original values
#[test]
fn rewritten_declarations_are_value_equivalent() {
    let source = "let a = 1;\nlet b = 'two';\nlet c = false;\nlet d = null;\nlet e = 0.25;";
    let original = normalize(source, &PrintOptions::default()).expect("parse");
    let extraction = fresh(source);

    for (original, rewritten) in original.body.iter().zip(&extraction.program.body) {
        let (Statement::Variable(original), Statement::Variable(rewritten)) = (original, rewritten)
        else {
            panic!("expected declarations");
        };
        let Some(Expression::Literal(literal)) = &original.declarators[0].init else {
            panic!("expected literal initializer");
        };
        let key = table_key(rewritten.declarators[0].init.as_ref().expect("initializer"));
        assert_eq!(extraction.vars.get(&key), literal.value.to_json().as_ref());
    }
}

fn table_key(expression: &Expression) -> String {
    match expression {
        Expression::Member {
            property: MemberProperty::Named(key),
            ..
        } if expression.is_table_access("__AllVars") => key.name.clone(),
        other => panic!("expected a table access, got {:?}", other),
    }
}

/// Print `program` with every `__AllVars.<key>` replaced by the value under `<key>`
fn inline_table(program: &Program, extraction: &Extraction) -> String {
    let mut printed = print_program(program, &PrintOptions::default());
    let mut entries: Vec<(&str, &Value)> = extraction.vars.iter().collect();
    // `a1_1` must be replaced before `a1`
    entries.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));
    for (key, value) in entries {
        let literal = match value {
            Value::String(text) => format!("'{}'", text),
            other => other.to_string(),
        };
        printed = printed.replace(&format!("__AllVars.{}", key), &literal);
    }
    printed
}

#[test]
fn literal_values_are_typed() {
    let extraction = fresh("let n = 0x10; let s = \"a\\nb\"; let t = true;");
    let values: Vec<&Value> = extraction.vars.iter().map(|(_, value)| value).collect();
    assert_eq!(values, vec![&json!(16), &json!("a\nb"), &json!(true)]);
}

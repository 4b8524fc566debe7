/// Scenario 3: string differences
///
/// The message points at the first differing character and quotes the
/// expected continuation.
use deepeq_core::{assert, AssertOptions, Heap, Value};

fn string_failure(actual: &str, expected: &str) -> String {
    let heap = Heap::new();
    let err = assert(
        &heap,
        AssertOptions::new(Value::from(actual), Value::from(expected)),
    )
    .expect_err("strings should differ");
    assert!(err.is_assertion_failure());
    err.message().to_string()
}

#[test]
fn test_scenario_03_error_unexpected_character() {
    // GIVEN two strings diverging at index 6
    // WHEN asserting
    let message = string_failure("hello world", "hello france");

    // THEN the caret sits under index 6 and the continuation is quoted
    assert_eq!(
        message,
        "unexpected character in string\n--- details ---\n\"hello world\"\n       ^\nunexpected \"w\", expected to continue with \"france\"\n--- path ---\nactual"
    );
}

#[test]
fn test_scenario_03_error_length_wording() {
    assert!(string_failure("hello", "hello world").starts_with("string is too short"));
    assert!(string_failure("hello world", "hello").starts_with("string is too long"));
}

#[test]
fn test_scenario_03_error_nested_string_path() {
    let mut heap = Heap::new();
    let a = heap.from_json(&serde_json::json!({"greeting": ["hi", "hello world"]}));
    let e = heap.from_json(&serde_json::json!({"greeting": ["hi", "hello france"]}));
    let err = assert(&heap, AssertOptions::new(a, e)).expect_err("should fail");

    assert!(err.message().starts_with("unexpected character in string"));
    assert_eq!(err.path(), Some("actual.greeting[1]"));
}

#[test]
fn test_scenario_03_happy_equal_strings() {
    let heap = Heap::new();
    let options = AssertOptions::new(Value::from("same"), Value::from("same"));
    assert!(assert(&heap, options).is_ok());
}

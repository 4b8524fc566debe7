use deepeq_core::{assert, AssertOptions, ExError, Heap, Value};

/// Build both documents in one heap and assert them.
#[allow(dead_code)]
pub fn assert_documents(
    actual: &serde_json::Value,
    expected: &serde_json::Value,
) -> Result<(), ExError> {
    let mut heap = Heap::new();
    let a = heap.from_json(actual);
    let e = heap.from_json(expected);
    assert(&heap, AssertOptions::new(a, e))
}

/// Assert two values that are expected to differ and return the failure.
///
/// # Panics
///
/// Panics if the assertion passes or fails with a usage error.
#[allow(dead_code)]
pub fn expect_failure(heap: &Heap, actual: Value, expected: Value) -> ExError {
    let err = assert(heap, AssertOptions::new(actual, expected))
        .expect_err("values should not be equivalent");
    assert!(err.is_assertion_failure(), "unexpected usage error: {}", err);
    err
}

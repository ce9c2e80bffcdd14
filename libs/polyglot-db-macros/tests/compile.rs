// Compile-fail tests for the Translatable derive macro.
// These files must not import external crates like sea_orm; only macro
// input diagnostics are checked here.

#[test]
fn trybuild_tests() {
    let t = trybuild::TestCases::new();

    t.compile_fail("tests/ui/err_non_struct.rs");
    t.compile_fail("tests/ui/err_missing_shared.rs");
    t.compile_fail("tests/ui/err_duplicate_shared.rs");
    t.compile_fail("tests/ui/err_unknown_attr.rs");
    t.compile_fail("tests/ui/err_non_string_value.rs");
    t.compile_fail("tests/ui/err_invalid_shared_path.rs");
}

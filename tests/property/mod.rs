// Property-based tests for the lexer, printer and refactoring providers.
//
// Run all properties:
//   cargo test --test property_tests
//
// More cases:
//   PROPTEST_CASES=1000 cargo test --test property_tests

mod lexer_properties;
mod refactor_properties;

pub mod constants;
pub mod types;
pub mod validation;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

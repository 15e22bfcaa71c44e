//! Unwrap helpers with good error messages.
//!
//! Use these instead of `unwrap()` in tests so a failure points at the test
//! line, not at the helper.

use std::fmt::Debug;

/// Unwrap a `Result`, panicking with the error value.
///
/// ```rust
/// use beatguard_test_helpers::must;
///
/// let value = must(Ok::<u32, &str>(4096));
/// assert_eq!(value, 4096);
/// ```
///
/// # Panics
///
/// Panics if the result is `Err`.
#[track_caller]
pub fn must<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("must: unexpected Err: {e:?}"),
    }
}

/// Unwrap an `Option`, panicking with `msg` if `None`.
///
/// ```rust
/// use beatguard_test_helpers::must_some;
///
/// let value = must_some(Some(512), "expected a stack mark");
/// assert_eq!(value, 512);
/// ```
///
/// # Panics
///
/// Panics if the option is `None`.
#[track_caller]
pub fn must_some<T>(option: Option<T>, msg: &str) -> T {
    match option {
        Some(v) => v,
        None => panic!("must_some: {msg}"),
    }
}

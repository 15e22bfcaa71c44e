//! # beatguard-errors
//!
//! Fault taxonomy and handling for the BeatGuard safety substrate.
//!
//! Faults are values ([`ErrorContext`]), not Rust errors: a reporter builds a
//! context, hands it to an [`ErrorHandler`], and the handler logs it, counts
//! it and decides whether the device must degrade into fail-safe mode.
//!
//! ## Severity policy
//!
//! | Severity            | Logged as  | Effect                                   |
//! |---------------------|------------|------------------------------------------|
//! | DEBUG/INFO/WARNING  | same level | handled locally                          |
//! | ERROR               | error      | handled locally, caller may retry        |
//! | CRITICAL            | error      | latches fail-safe                        |
//! | FATAL               | critical   | latches fail-safe, strategy SYSTEM_RESET |
//!
//! Recovery from the latch is explicit ([`ErrorHandler::attempt_recovery`])
//! and is refused once [`ERROR_COUNT_CEILING`] faults have accumulated.
//!
//! ## Example
//!
//! ```rust
//! use beatguard_errors::prelude::*;
//! use beatguard_platform::TracingLogger;
//!
//! let logger = TracingLogger::new();
//! let mut handler = DefaultErrorHandler::new(&logger);
//!
//! let ok = handler.handle_error(ErrorContext::new(
//!     ErrorCode::Timeout,
//!     ErrorSeverity::Warning,
//!     "sensor read slow",
//!     1_000,
//! ));
//! assert!(ok);
//! assert_eq!(
//!     handler.recovery_action(ErrorCode::Timeout).strategy,
//!     RecoveryStrategy::Retry
//! );
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]

pub mod code;
pub mod context;
pub mod handler;
pub mod prelude;
pub mod recovery;
pub mod scope;

pub use code::{ErrorCode, ErrorSeverity, InvalidErrorCode, RecoveryStrategy};
pub use context::{ErrorContext, ErrorMessage, MAX_MESSAGE_LEN};
pub use handler::{DefaultErrorHandler, ERROR_COUNT_CEILING, ErrorHandler};
pub use recovery::{RecoveryAction, RecoveryFn, RecoveryOutcome};
pub use scope::ErrorScope;

//! Convenience re-exports for fault reporters.

pub use crate::code::{ErrorCode, ErrorSeverity, RecoveryStrategy};
pub use crate::context::ErrorContext;
pub use crate::handler::{DefaultErrorHandler, ErrorHandler};
pub use crate::recovery::{RecoveryAction, RecoveryFn, RecoveryOutcome};
pub use crate::scope::ErrorScope;

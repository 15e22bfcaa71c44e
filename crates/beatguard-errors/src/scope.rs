//! Scoped fault tracking.

use crate::context::ErrorContext;
use crate::handler::ErrorHandler;

/// Forwards reports to a handler while remembering whether the scope failed.
///
/// Useful around a multi-step operation (bring-up, a detection frame) where
/// the caller wants a single "did anything go wrong" answer at the end.
pub struct ErrorScope<'h, H: ErrorHandler + ?Sized> {
    handler: &'h mut H,
    name: &'static str,
    last_error: Option<ErrorContext>,
}

impl<'h, H: ErrorHandler + ?Sized> ErrorScope<'h, H> {
    /// Open a scope named `name`.
    pub fn new(handler: &'h mut H, name: &'static str) -> Self {
        Self {
            handler,
            name,
            last_error: None,
        }
    }

    /// Forward a report to the handler and remember it.
    ///
    /// Returns the handler's verdict.
    pub fn report(&mut self, ctx: ErrorContext) -> bool {
        self.last_error = Some(ctx.clone());
        self.handler.handle_error(ctx)
    }

    /// Whether any report was made since the scope opened or was cleared.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    /// The most recent report.
    #[must_use]
    pub fn last_error(&self) -> Option<&ErrorContext> {
        self.last_error.as_ref()
    }

    /// Forget the recorded report.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Scope name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<H: ErrorHandler + ?Sized> Drop for ErrorScope<'_, H> {
    fn drop(&mut self) {
        if let Some(ctx) = &self.last_error {
            tracing::debug!(
                scope = self.name,
                code = ctx.code.as_str(),
                severity = ctx.severity.as_str(),
                "scope exited with error"
            );
        }
    }
}

impl<H: ErrorHandler + ?Sized> core::fmt::Debug for ErrorScope<'_, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ErrorScope")
            .field("name", &self.name)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

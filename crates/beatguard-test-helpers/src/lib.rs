//! Shared test utilities for BeatGuard.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`logger`] - A [`Logger`](beatguard_platform::Logger) that records every line
//! - [`health`] - A switchable health-check callback
//! - [`fixtures`] - Simulated clock, platform and logger bundled together
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! beatguard-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use beatguard_test_helpers::prelude::*;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod fixtures;
pub mod health;
pub mod logger;
pub mod must;
pub mod prelude;

pub use fixtures::SafetyFixture;
pub use health::HealthSwitch;
pub use logger::{LogEntry, RecordingLogger};
pub use must::*;

//! Failure artifacts and the test identity used to file them.

pub mod context;
pub mod sink;

pub use context::{resolve_current_test, TestContext, TestIdentity};
pub use sink::capture_on_failure;

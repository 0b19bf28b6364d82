pub mod browser;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod harness;
pub mod interaction;
pub mod selectors;
pub mod session;
pub mod wait;

pub use browser::BrowserSession;
pub use config::Configuration;
pub use error::{FailureKind, HarnessError};
pub use harness::Harness;

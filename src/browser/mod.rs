//! Chrome discovery, launch and tab bookkeeping.

pub mod launcher;
pub mod pool;
pub mod session;

pub use session::BrowserSession;

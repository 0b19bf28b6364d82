use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::context::TestIdentity;
use crate::config::Configuration;
use crate::session::Session;

pub const SCREENSHOT_FILE: &str = "screen-shot.png";
pub const LOG_FILE: &str = "browser-logs.txt";
const UNKNOWN_SUITE: &str = "UnknownTestClass";
const UNKNOWN_CASE: &str = "UnknownTestName";

/// `<root>/<suite>/<case>/<timestamp>`
pub fn bundle_dir(root: &Path, identity: &TestIdentity, at: DateTime<Local>) -> PathBuf {
    let suite = identity.suite.as_deref().unwrap_or(UNKNOWN_SUITE);
    let case = identity.case.as_deref().unwrap_or(UNKNOWN_CASE);
    root.join(path_safe(suite))
        .join(path_safe(case))
        .join(at.format("%Y-%d-%m-%H.%M.%S").to_string())
}

fn path_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

/// Save a screenshot and the browser log transcript for a failed test.
///
/// Never fails. Returns the directory written to, or `None` when neither
/// artifact is enabled.
pub async fn capture_on_failure<S: Session + ?Sized>(
    session: &S,
    config: &Configuration,
    identity: &TestIdentity,
) -> Option<PathBuf> {
    let fallback = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    capture_into(session, config, identity, &fallback).await
}

pub(crate) async fn capture_into<S: Session + ?Sized>(
    session: &S,
    config: &Configuration,
    identity: &TestIdentity,
    fallback: &Path,
) -> Option<PathBuf> {
    if !config.capture_screenshot_on_failure && !config.capture_browser_logs_on_failure {
        return None;
    }

    let wanted = bundle_dir(&config.screenshot_directory, identity, Local::now());
    let dir = match tokio::fs::create_dir_all(&wanted).await {
        Ok(()) => wanted,
        Err(e) => {
            tracing::warn!(
                "Could not create {}: {}; writing diagnostics to {}",
                wanted.display(),
                e,
                fallback.display()
            );
            fallback.to_path_buf()
        }
    };

    if config.capture_screenshot_on_failure {
        match session.screenshot().await {
            Ok(png) => {
                let path = dir.join(SCREENSHOT_FILE);
                match tokio::fs::write(&path, png).await {
                    Ok(()) => tracing::info!("Saved screenshot to {}", path.display()),
                    Err(e) => tracing::warn!("Failed to write {}: {}", path.display(), e),
                }
            }
            Err(e) => tracing::warn!("Failed to take screenshot: {:#}", e),
        }
    }

    if config.capture_browser_logs_on_failure {
        match session.logs().await {
            Ok(entries) if entries.is_empty() => {
                tracing::debug!("Browser log is empty, nothing to save");
            }
            Ok(entries) => {
                let transcript: String = entries.iter().map(|e| format!("{}\n", e)).collect();
                let path = dir.join(LOG_FILE);
                match tokio::fs::write(&path, transcript).await {
                    Ok(()) => tracing::info!("Saved browser logs to {}", path.display()),
                    Err(e) => tracing::warn!("Failed to write {}: {}", path.display(), e),
                }
            }
            Err(e) => tracing::warn!("Failed to fetch browser logs: {:#}", e),
        }
    }

    Some(dir)
}

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::config::Configuration;

/// Locate Chrome: an explicit path first, then well-known install
/// locations, then `PATH`.
pub fn find_chrome_binary(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        bail!("Configured Chrome binary does not exist: {}", path.display());
    }

    let candidates = chrome_candidates();
    if let Some(path) = candidates.iter().map(PathBuf::from).find(|p| p.exists()) {
        tracing::info!("Found Chrome at: {}", path.display());
        return Ok(path);
    }

    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium-browser",
        "chromium",
    ] {
        if let Ok(path) = which::which(name) {
            tracing::info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    bail!(
        "Could not find Chrome or Chromium. Searched:\n{}",
        candidates.join("\n")
    )
}

fn chrome_candidates() -> Vec<String> {
    let mut candidates = Vec::new();

    #[cfg(target_os = "macos")]
    {
        candidates.extend([
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".into(),
            "/Applications/Chromium.app/Contents/MacOS/Chromium".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            candidates.push(format!(
                "{}/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                home
            ));
        }
    }

    #[cfg(target_os = "linux")]
    {
        candidates.extend([
            "/usr/bin/google-chrome".into(),
            "/usr/bin/google-chrome-stable".into(),
            "/usr/bin/chromium-browser".into(),
            "/usr/bin/chromium".into(),
            "/snap/bin/chromium".into(),
        ]);
    }

    #[cfg(target_os = "windows")]
    {
        for var in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(dir) = std::env::var(var) {
                candidates.push(format!("{}\\Google\\Chrome\\Application\\chrome.exe", dir));
            }
        }
    }

    candidates
}

/// Command-line switches for a test browser. Headless mode itself is set on
/// the launch config, not here.
pub fn chrome_args(config: &Configuration) -> Vec<String> {
    let mut args: Vec<String> = [
        "--ignore-certificate-errors",
        "--no-first-run",
        "--no-default-browser-check",
        "--disable-background-networking",
        "--disable-client-side-phishing-detection",
        "--disable-default-apps",
        "--disable-extensions",
        "--disable-hang-monitor",
        "--disable-popup-blocking",
        "--disable-prompt-on-repost",
        "--disable-sync",
        "--disable-translate",
        "--metrics-recording-only",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    if config.run_chrome_headless {
        args.push("--disable-gpu".into());
    }

    for extra in &config.chrome_args {
        if !args.contains(extra) {
            args.push(extra.clone());
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_adds_gpu_switch() {
        let config = Configuration::default();
        assert!(chrome_args(&config).contains(&"--disable-gpu".to_string()));

        let headed = Configuration {
            run_chrome_headless: false,
            ..Configuration::default()
        };
        assert!(!chrome_args(&headed).contains(&"--disable-gpu".to_string()));
    }

    #[test]
    fn test_extra_args_appended_once() {
        let config = Configuration {
            chrome_args: vec!["--no-sandbox".into(), "--no-first-run".into()],
            ..Configuration::default()
        };
        let args = chrome_args(&config);
        assert_eq!(args.last().map(String::as_str), Some("--no-sandbox"));
        assert_eq!(args.iter().filter(|a| *a == "--no-first-run").count(), 1);
    }

    #[test]
    fn test_missing_configured_binary_is_an_error() {
        let err = find_chrome_binary(Some(Path::new("/definitely/not/chrome"))).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/chrome"));
    }
}

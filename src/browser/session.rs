use anyhow::{anyhow, Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::launcher;
use super::pool::TabPool;
use crate::config::Configuration;
use crate::harness::Harness;
use crate::session::cdp::CdpSession;

/// One launched Chrome and its tabs.
///
/// Every tab is handed out as its own [`CdpSession`]; switching tabs only
/// changes which session [`BrowserSession::active_tab`] returns, never the
/// sessions already handed out.
pub struct BrowserSession {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
    pool: Arc<Mutex<TabPool<CdpSession>>>,
    config: Configuration,
    _user_data_dir: tempfile::TempDir,
}

impl BrowserSession {
    /// Launch Chrome with a throwaway profile and open one blank tab.
    pub async fn launch(config: &Configuration) -> Result<Self> {
        let executable = launcher::find_chrome_binary(config.chrome_binary.as_deref())?;
        let user_data_dir = tempfile::Builder::new()
            .prefix("ui-harness-profile-")
            .tempdir()
            .context("Failed to create Chrome profile directory")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .user_data_dir(user_data_dir.path())
            .args(launcher::chrome_args(config))
            .window_size(1280, 1024);
        builder = if config.run_chrome_headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        let browser_config = builder.build().map_err(|e| anyhow!("{}", e))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("Failed to launch Chrome")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to create initial page")?;
        let tab = CdpSession::attach(page).await?;

        tracing::info!(
            "Browser session started (headless: {})",
            config.run_chrome_headless
        );

        Ok(Self {
            browser,
            handler_task,
            pool: Arc::new(Mutex::new(TabPool::new(tab))),
            config: config.clone(),
            _user_data_dir: user_data_dir,
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub async fn active_tab(&self) -> Result<CdpSession> {
        let pool = self.pool.lock().await;
        pool.active().cloned().ok_or_else(|| anyhow!("No open tabs"))
    }

    /// A harness over the active tab.
    pub async fn harness(&self) -> Result<Harness<CdpSession>> {
        Ok(Harness::new(self.active_tab().await?, self.config.clone()))
    }

    /// Open a blank tab and make it active.
    pub async fn new_tab(&self) -> Result<CdpSession> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create new page")?;
        let tab = CdpSession::attach(page).await?;
        let mut pool = self.pool.lock().await;
        let index = pool.add(tab.clone());
        tracing::debug!("Opened tab {}", index);
        Ok(tab)
    }

    /// Activate the tab at zero-based `index`.
    pub async fn switch_to_tab(&self, index: usize) -> Result<CdpSession> {
        let mut pool = self.pool.lock().await;
        let count = pool.len();
        let tab = pool
            .select(index)
            .cloned()
            .ok_or_else(|| anyhow!("Failed to switch to tab {} ({} open)", index, count))?;
        tab.page()
            .bring_to_front()
            .await
            .context("Failed to bring tab to front")?;
        Ok(tab)
    }

    pub async fn current_tab(&self) -> usize {
        self.pool.lock().await.active_index()
    }

    pub async fn tab_count(&self) -> usize {
        self.pool.lock().await.len()
    }

    /// Close the tab at `index`, or the active tab when `None`.
    pub async fn close_tab(&self, index: Option<usize>) -> Result<()> {
        let mut pool = self.pool.lock().await;
        let index = index.unwrap_or_else(|| pool.active_index());
        let tab = pool
            .remove(index)
            .ok_or_else(|| anyhow!("No tab at index {}", index))?;
        tab.page().clone().close().await.context("Failed to close tab")?;
        Ok(())
    }

    /// Close every tab except the active one.
    pub async fn close_other_tabs(&self) -> Result<()> {
        let mut pool = self.pool.lock().await;
        for tab in pool.retain_active() {
            if let Err(e) = tab.page().clone().close().await {
                tracing::warn!("Failed to close tab: {}", e);
            }
        }
        Ok(())
    }

    /// Shut Chrome down.
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        Ok(())
    }
}

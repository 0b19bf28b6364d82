use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::log as cdp_log;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotParams;
use chromiumoxide::cdp::js_protocol::runtime as cdp_runtime;
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::console::ConsoleLog;
use super::{ElementRef, LogEntry, Modifiers, Query, Scope, Session};
use crate::interaction::{click, keyboard};

/// Page-side element registry. Handles are `<page token>:<seq>`, so a handle
/// minted before a navigation never resolves on the next document.
const REGISTRY_JS: &str = r#"
    const reg = window.__uiHarness || (window.__uiHarness = {
        token: Math.random().toString(36).slice(2, 10),
        seq: 0,
        byId: new Map(),
        ids: new WeakMap()
    });
    const refOf = (el) => {
        let id = reg.ids.get(el);
        if (!id) {
            id = reg.token + ':' + (++reg.seq);
            reg.ids.set(el, id);
            reg.byId.set(id, el);
        }
        return id;
    };
    const lookup = (id) => {
        const el = reg.byId.get(id);
        if (!el || !el.isConnected) throw new Error('stale element reference: ' + id);
        return el;
    };
"#;

#[derive(Deserialize)]
struct Wrapped<T> {
    v: T,
}

/// A [`Session`] driving one Chrome tab over CDP.
#[derive(Clone)]
pub struct CdpSession {
    page: Page,
    console: ConsoleLog,
}

impl CdpSession {
    /// Wrap `page` and start recording its console and log events.
    pub async fn attach(page: Page) -> Result<Self> {
        let console = ConsoleLog::new();

        // Best-effort: a tab without Log.enable still works, just with
        // console API messages only.
        if let Err(e) = page.execute(cdp_log::EnableParams::default()).await {
            tracing::debug!("Log.enable failed: {}", e);
        }

        let mut console_events = page
            .event_listener::<cdp_runtime::EventConsoleApiCalled>()
            .await
            .context("Failed to subscribe to console events")?;
        let sink = console.clone();
        tokio::spawn(async move {
            while let Some(evt) = console_events.next().await {
                let message = evt
                    .args
                    .iter()
                    .map(|arg| match &arg.value {
                        Some(serde_json::Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => arg.description.clone().unwrap_or_default(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                sink.add(LogEntry {
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    level: format!("{:?}", evt.r#type),
                    message,
                })
                .await;
            }
        });

        let mut log_events = page
            .event_listener::<cdp_log::EventEntryAdded>()
            .await
            .context("Failed to subscribe to log events")?;
        let sink = console.clone();
        tokio::spawn(async move {
            while let Some(evt) = log_events.next().await {
                sink.add(LogEntry {
                    timestamp: chrono::Utc::now().to_rfc3339(),
                    level: format!("{:?}", evt.entry.level),
                    message: evt.entry.text.clone(),
                })
                .await;
            }
        });

        Ok(Self { page, console })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn console(&self) -> &ConsoleLog {
        &self.console
    }

    async fn eval<T: DeserializeOwned>(&self, js: String, what: &str) -> Result<T> {
        let wrapped: Wrapped<T> = self
            .page
            .evaluate(js)
            .await
            .with_context(|| format!("Failed to evaluate {}", what))?
            .into_value()
            .with_context(|| format!("Failed to parse {} result", what))?;
        Ok(wrapped.v)
    }

    async fn on_element<T: DeserializeOwned>(
        &self,
        element: &ElementRef,
        body: &str,
        what: &str,
    ) -> Result<T> {
        self.eval(element_script(element, body)?, what).await
    }

    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

fn element_script(element: &ElementRef, body: &str) -> Result<String> {
    Ok(format!(
        r#"(() => {{
            {registry}
            const el = lookup({id});
            {body}
        }})()"#,
        registry = REGISTRY_JS,
        id = serde_json::to_string(element.id())?,
        body = body,
    ))
}

fn find_script(scope: Scope<'_>, query: &Query) -> Result<String> {
    let root = match scope {
        Scope::Document => "document".to_string(),
        Scope::Within(el) => format!("lookup({})", serde_json::to_string(el.id())?),
    };
    let collect = match query {
        Query::Css(selector) => format!(
            "Array.from(root.querySelectorAll({}))",
            serde_json::to_string(selector)?
        ),
        Query::Id(id) => format!(
            "Array.from(root.querySelectorAll('#' + CSS.escape({})))",
            serde_json::to_string(id)?
        ),
        Query::XPath(expr) => format!(
            r#"(() => {{
                const result = document.evaluate(
                    {expr},
                    root,
                    null,
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE,
                    null
                );
                const out = [];
                for (let i = 0; i < result.snapshotLength; i++) {{
                    out.push(result.snapshotItem(i));
                }}
                return out;
            }})()"#,
            expr = serde_json::to_string(expr)?
        ),
    };
    Ok(format!(
        r#"(() => {{
            {registry}
            const root = {root};
            const nodes = {collect};
            return {{ v: nodes.filter(n => n.nodeType === Node.ELEMENT_NODE).map(refOf) }};
        }})()"#,
        registry = REGISTRY_JS,
        root = root,
        collect = collect,
    ))
}

#[async_trait]
impl Session for CdpSession {
    async fn find(&self, scope: Scope<'_>, query: &Query) -> Result<Vec<ElementRef>> {
        let ids: Vec<String> = self.eval(find_script(scope, query)?, "element query").await?;
        Ok(ids.into_iter().map(ElementRef::new).collect())
    }

    async fn tag_name(&self, element: &ElementRef) -> Result<String> {
        self.on_element(element, "return { v: el.tagName.toLowerCase() };", "tag name")
            .await
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let body = format!(
            r#"
            const name = {name};
            if (name === 'value' && 'value' in el && el.value != null) {{
                return {{ v: String(el.value) }};
            }}
            return {{ v: el.getAttribute(name) }};
            "#,
            name = serde_json::to_string(name)?
        );
        self.on_element(element, &body, "attribute").await
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        self.on_element(
            element,
            "return { v: (el.innerText || el.textContent || '').trim() };",
            "element text",
        )
        .await
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool> {
        self.on_element(
            element,
            "return { v: !(el.disabled || el.closest('fieldset:disabled')) };",
            "enabled state",
        )
        .await
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.on_element(
            element,
            r#"
            const style = getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            return { v: style.display !== 'none'
                && style.visibility !== 'hidden'
                && parseFloat(style.opacity) > 0
                && rect.width > 0
                && rect.height > 0 };
            "#,
            "visibility",
        )
        .await
    }

    async fn is_selected(&self, element: &ElementRef) -> Result<bool> {
        self.on_element(
            element,
            "return { v: !!(el.checked || el.selected) };",
            "selected state",
        )
        .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(CaptureScreenshotParams::builder().build())
            .await
            .context("Failed to take screenshot")
    }

    async fn logs(&self) -> Result<Vec<LogEntry>> {
        Ok(self.console.snapshot().await)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await?.unwrap_or_default())
    }

    async fn goto(&self, url: &str) -> Result<()> {
        tracing::info!("Navigating to: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        self.page
            .evaluate("window.history.back()")
            .await
            .context("Failed to go back")?;
        self.settle().await;
        Ok(())
    }

    async fn forward(&self) -> Result<()> {
        self.page
            .evaluate("window.history.forward()")
            .await
            .context("Failed to go forward")?;
        self.settle().await;
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.page.reload().await.context("Failed to reload")?;
        self.settle().await;
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let _: bool = self.on_element(element, click::click_body(), "click").await?;
        Ok(())
    }

    async fn double_click(&self, element: &ElementRef) -> Result<()> {
        let _: bool = self
            .on_element(element, click::double_click_body(), "double click")
            .await?;
        Ok(())
    }

    async fn hover(&self, element: &ElementRef) -> Result<()> {
        let _: bool = self.on_element(element, click::hover_body(), "hover").await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        let _: bool = self
            .on_element(element, keyboard::clear_body(), "clear")
            .await?;
        Ok(())
    }

    async fn send_keys(
        &self,
        element: &ElementRef,
        text: &str,
        modifiers: Modifiers,
        per_character: bool,
    ) -> Result<()> {
        let body = keyboard::type_text_body(text, modifiers, per_character)?;
        let _: bool = self.on_element(element, &body, "typing").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_script_scopes_to_element() {
        let scope_el = ElementRef::new("abc:3");
        let js = find_script(Scope::Within(&scope_el), &Query::Css("li".into())).unwrap();
        assert!(js.contains(r#"const root = lookup("abc:3");"#));
        assert!(js.contains(r#"root.querySelectorAll("li")"#));
    }

    #[test]
    fn test_find_script_xpath_uses_snapshot() {
        let js = find_script(Scope::Document, &Query::XPath("//a[@id='x']".into())).unwrap();
        assert!(js.contains("const root = document;"));
        assert!(js.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
        assert!(js.contains(r#""//a[@id='x']""#));
    }

    #[test]
    fn test_find_script_id_is_css_escaped() {
        let js = find_script(Scope::Document, &Query::Id("a.b".into())).unwrap();
        assert!(js.contains(r#"CSS.escape("a.b")"#));
    }

    #[test]
    fn test_element_script_looks_up_handle() {
        let js = element_script(&ElementRef::new("t:1"), "return { v: 1 };").unwrap();
        assert!(js.contains(r#"const el = lookup("t:1");"#));
        assert!(js.contains("return { v: 1 };"));
    }
}

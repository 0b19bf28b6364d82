//! In-memory session used by unit tests.
//!
//! Queries are not evaluated: each `(scope, query)` pair is answered from a
//! table registered up front.

use super::{ElementRef, LogEntry, Modifiers, Query, Scope, Session};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub enabled: bool,
    pub displayed: bool,
    pub selected: bool,
}

impl FakeElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            enabled: true,
            displayed: true,
            ..Default::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }
}

type QueryKey = (Option<String>, Query);

#[derive(Default)]
struct State {
    elements: HashMap<String, FakeElement>,
    answers: HashMap<QueryKey, Vec<String>>,
    failing: HashSet<Query>,
    /// Remaining number of finds that answer empty before the real answer.
    delayed: HashMap<Query, usize>,
    broken: HashSet<String>,
    logs: Vec<LogEntry>,
    url: String,
    title: String,
    screenshot_fails: bool,
    logs_fail: bool,
    find_calls: usize,
    clicks: Vec<String>,
    hovers: Vec<String>,
}

#[derive(Default)]
pub struct FakeSession {
    state: Mutex<State>,
}

impl FakeSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn element(&self, id: &str, element: FakeElement) -> ElementRef {
        self.with(|s| s.elements.insert(id.to_string(), element));
        ElementRef::new(id)
    }

    /// Answer `query` in the document scope.
    pub fn answer(&self, query: Query, ids: &[&str]) {
        self.answer_within(None, query, ids);
    }

    pub fn answer_within(&self, scope: Option<&str>, query: Query, ids: &[&str]) {
        let ids = ids.iter().map(|id| id.to_string()).collect();
        self.with(|s| s.answers.insert((scope.map(str::to_string), query), ids));
    }

    pub fn fail_query(&self, query: Query) {
        self.with(|s| s.failing.insert(query));
    }

    pub fn delay_query(&self, query: Query, finds: usize) {
        self.with(|s| s.delayed.insert(query, finds));
    }

    /// Every operation on `id` fails, as if the node went stale.
    pub fn break_element(&self, id: &str) {
        self.with(|s| s.broken.insert(id.to_string()));
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) {
        self.with(|s| {
            if let Some(el) = s.elements.get_mut(id) {
                el.enabled = enabled;
            }
        });
    }

    pub fn push_log(&self, level: &str, message: &str) {
        self.with(|s| {
            s.logs.push(LogEntry {
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                level: level.to_string(),
                message: message.to_string(),
            })
        });
    }

    pub fn set_page(&self, url: &str, title: &str) {
        self.with(|s| {
            s.url = url.to_string();
            s.title = title.to_string();
        });
    }

    pub fn fail_screenshot(&self) {
        self.with(|s| s.screenshot_fails = true);
    }

    pub fn fail_logs(&self) {
        self.with(|s| s.logs_fail = true);
    }

    pub fn find_calls(&self) -> usize {
        self.with(|s| s.find_calls)
    }

    pub fn clicks(&self) -> Vec<String> {
        self.with(|s| s.clicks.clone())
    }

    pub fn hovers(&self) -> Vec<String> {
        self.with(|s| s.hovers.clone())
    }

    pub fn attribute_of(&self, id: &str, name: &str) -> Option<String> {
        self.with(|s| s.elements.get(id).and_then(|e| e.attributes.get(name).cloned()))
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.with(|s| s.elements.get(id).map(|e| e.selected).unwrap_or(false))
    }

    fn read<R>(&self, element: &ElementRef, f: impl FnOnce(&FakeElement) -> R) -> Result<R> {
        self.with(|s| {
            if s.broken.contains(element.id()) {
                bail!("stale element reference: {}", element.id());
            }
            s.elements
                .get(element.id())
                .map(f)
                .ok_or_else(|| anyhow!("unknown element: {}", element.id()))
        })
    }

    fn write(&self, element: &ElementRef, f: impl FnOnce(&mut FakeElement)) -> Result<()> {
        self.with(|s| {
            if s.broken.contains(element.id()) {
                bail!("stale element reference: {}", element.id());
            }
            let el = s
                .elements
                .get_mut(element.id())
                .ok_or_else(|| anyhow!("unknown element: {}", element.id()))?;
            f(el);
            Ok(())
        })
    }
}

#[async_trait]
impl Session for FakeSession {
    async fn find(&self, scope: Scope<'_>, query: &Query) -> Result<Vec<ElementRef>> {
        self.with(|s| {
            s.find_calls += 1;
            if s.failing.contains(query) {
                bail!("invalid query: {}", query);
            }
            if let Some(remaining) = s.delayed.get_mut(query) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Ok(Vec::new());
                }
            }
            let key = (scope.element().map(|e| e.id().to_string()), query.clone());
            Ok(s.answers
                .get(&key)
                .map(|ids| ids.iter().map(ElementRef::new).collect())
                .unwrap_or_default())
        })
    }

    async fn tag_name(&self, element: &ElementRef) -> Result<String> {
        self.read(element, |e| e.tag.clone())
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        self.read(element, |e| e.attributes.get(name).cloned())
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        self.read(element, |e| e.text.clone())
    }

    async fn is_enabled(&self, element: &ElementRef) -> Result<bool> {
        self.read(element, |e| e.enabled)
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.read(element, |e| e.displayed)
    }

    async fn is_selected(&self, element: &ElementRef) -> Result<bool> {
        self.read(element, |e| e.selected)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        if self.with(|s| s.screenshot_fails) {
            bail!("screenshot capability unavailable");
        }
        Ok(vec![0x89, 0x50, 0x4E, 0x47])
    }

    async fn logs(&self) -> Result<Vec<LogEntry>> {
        if self.with(|s| s.logs_fail) {
            bail!("log transcript unavailable");
        }
        Ok(self.with(|s| s.logs.clone()))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.with(|s| s.url.clone()))
    }

    async fn title(&self) -> Result<String> {
        Ok(self.with(|s| s.title.clone()))
    }

    async fn goto(&self, url: &str) -> Result<()> {
        self.with(|s| s.url = url.to_string());
        Ok(())
    }

    async fn back(&self) -> Result<()> {
        Ok(())
    }

    async fn forward(&self) -> Result<()> {
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        Ok(())
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.write(element, |e| {
            if e.tag == "input" {
                e.selected = !e.selected;
            }
        })?;
        self.with(|s| s.clicks.push(element.id().to_string()));
        Ok(())
    }

    async fn double_click(&self, element: &ElementRef) -> Result<()> {
        self.write(element, |_| {})?;
        self.with(|s| s.clicks.push(format!("dbl:{}", element.id())));
        Ok(())
    }

    async fn hover(&self, element: &ElementRef) -> Result<()> {
        self.write(element, |_| {})?;
        self.with(|s| s.hovers.push(element.id().to_string()));
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.write(element, |e| {
            e.attributes.insert("value".to_string(), String::new());
        })
    }

    async fn send_keys(
        &self,
        element: &ElementRef,
        text: &str,
        _modifiers: Modifiers,
        _per_character: bool,
    ) -> Result<()> {
        self.write(element, |e| {
            e.attributes.entry("value".to_string()).or_default().push_str(text);
        })
    }
}

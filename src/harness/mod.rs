//! The per-test façade.
//!
//! A [`Harness`] owns one session, the configuration and (optionally) the
//! identity of the test using it. The core entry points live here; the
//! action verbs are in [`act`] and the assertions in [`assert`].

pub mod act;
pub mod assert;

use async_trait::async_trait;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::Configuration;
use crate::diagnostics::{self, TestContext, TestIdentity};
use crate::error::Result;
use crate::selectors;
use crate::session::{ElementRef, Scope, Session};
use crate::wait::{self, Attempt, FailureCapture};

pub use act::ClickOptions;

pub struct Harness<S: Session> {
    session: S,
    config: Configuration,
    context: Option<TestContext>,
}

impl<S: Session> Harness<S> {
    pub fn new(session: S, config: Configuration) -> Self {
        Self {
            session,
            config,
            context: None,
        }
    }

    /// A harness whose failures are filed under `suite`/`case`.
    pub fn for_test(
        session: S,
        config: Configuration,
        suite: impl Into<String>,
        case: impl Into<String>,
    ) -> Self {
        Self::new(session, config).with_context(TestContext::new(suite, case))
    }

    pub fn with_context(mut self, context: TestContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The explicit test context when one was given, otherwise whatever the
    /// current thread reveals.
    pub fn resolve_current_test(&self) -> TestIdentity {
        match &self.context {
            Some(context) => context.identity(),
            None => diagnostics::resolve_current_test(),
        }
    }

    pub async fn capture_on_failure(&self) -> Option<PathBuf> {
        let identity = self.resolve_current_test();
        diagnostics::capture_on_failure(&self.session, &self.config, &identity).await
    }

    /// Wait until `op` returns `true`.
    pub async fn await_bool<F, Fut>(&self, budget: Duration, op: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        wait::until(budget, Some(self), op).await
    }

    /// Wait until `op` produces a value.
    pub async fn await_value<T, F, Fut>(&self, budget: Duration, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        wait::until_value(budget, Some(self), op).await
    }

    pub(crate) async fn retry<T, F, Fut>(&self, budget: Duration, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        wait::poll(budget, Some(self), op).await
    }

    /// One scan, no waiting.
    pub(crate) async fn scan(&self, selector: &str, scope: Scope<'_>) -> Vec<ElementRef> {
        selectors::find_elements(&self.session, selector, scope).await
    }

    /// One scan reduced to a single element under the configured strictness.
    pub(crate) async fn scan_one(&self, selector: &str) -> Result<Option<ElementRef>> {
        let found = self.scan(selector, Scope::Document).await;
        selectors::pick_one(selector, found, self.config.throw_if_more_than_one_element)
    }

    /// Scan until at least one element matches.
    pub async fn locate(&self, selector: &str, scope: Scope<'_>) -> Result<Vec<ElementRef>> {
        self.retry(self.config.element_timeout(), move || async move {
            let found = self.scan(selector, scope).await;
            if found.is_empty() {
                Attempt::Pending
            } else {
                Attempt::Ready(found)
            }
        })
        .await
    }

    /// Scan once; an empty result is a result.
    pub async fn locate_unreliable(
        &self,
        selector: &str,
        scope: Scope<'_>,
    ) -> Result<Vec<ElementRef>> {
        self.retry(self.config.element_timeout(), move || async move {
            Attempt::Ready(self.scan(selector, scope).await)
        })
        .await
    }

    /// Reliable locate reduced to one element.
    ///
    /// An empty scan never reaches the reduction: the reliable locate times
    /// out first. Several matches fail with `Ambiguous` when
    /// `throw_if_ambiguous` is set and yield the first otherwise.
    pub async fn locate_one(
        &self,
        selector: &str,
        scope: Scope<'_>,
        throw_if_ambiguous: bool,
    ) -> Result<Option<ElementRef>> {
        let found = self.locate(selector, scope).await?;
        selectors::pick_one(selector, found, throw_if_ambiguous)
    }

    pub async fn element(&self, selector: &str) -> Result<Option<ElementRef>> {
        self.locate_one(
            selector,
            Scope::Document,
            self.config.throw_if_more_than_one_element,
        )
        .await
    }

    pub async fn elements(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.locate(selector, Scope::Document).await
    }
}

#[async_trait]
impl<S: Session> FailureCapture for Harness<S> {
    async fn capture(&self) {
        if let Some(dir) = self.capture_on_failure().await {
            tracing::info!("Failure diagnostics written to {}", dir.display());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::selectors::css;
    use crate::session::fake::{FakeElement, FakeSession};
    use std::path::Path;

    pub(crate) fn config_in(root: &Path) -> Configuration {
        Configuration {
            screenshot_directory: root.to_path_buf(),
            page_timeout: 5,
            element_timeout: 5,
            compare_timeout: 5,
            animation_wait_time_ms: 0,
            ..Configuration::default()
        }
    }

    pub(crate) fn harness(session: FakeSession, root: &Path) -> Harness<FakeSession> {
        Harness::for_test(session, config_in(root), "HarnessSuite", "case")
    }

    /// Every bundle directory under `root`.
    pub(crate) fn bundles(root: &Path) -> Vec<PathBuf> {
        let case_dir = root.join("HarnessSuite").join("case");
        match std::fs::read_dir(case_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_enabled_toggle_is_seen_at_once() {
        let root = tempfile::tempdir().unwrap();
        let session = FakeSession::new();
        session.element("toggle", FakeElement::new("button").attr("id", "toggle"));
        session.answer(css::structural("#toggle"), &["toggle"]);
        let harness = harness(session, root.path());

        let started = tokio::time::Instant::now();
        let h = &harness;
        let enabled = harness
            .await_bool(Duration::from_secs(5), move || async move {
                match h.scan_one("#toggle").await? {
                    Some(el) => Ok(h.session().is_enabled(&el).await?),
                    None => Ok(false),
                }
            })
            .await
            .unwrap();

        assert!(enabled);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(bundles(root.path()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_element_times_out_with_one_bundle() {
        let root = tempfile::tempdir().unwrap();
        let session = FakeSession::new();
        session.push_log("Error", "render failed");
        let harness = harness(session, root.path());

        let started = tokio::time::Instant::now();
        let h = &harness;
        let err = harness
            .await_bool(Duration::from_secs(5), move || async move {
                match h.scan_one("#missing").await? {
                    Some(el) => Ok(h.session().is_enabled(&el).await?),
                    None => Ok(false),
                }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, HarnessError::Timeout));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_millis(5500));

        let bundles = bundles(root.path());
        assert_eq!(bundles.len(), 1);
        let files: Vec<_> = std::fs::read_dir(&bundles[0])
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert!(files.len() <= 2);
        assert!(bundles[0].join("screen-shot.png").exists());
        assert!(bundles[0].join("browser-logs.txt").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_waits_for_late_element() {
        let root = tempfile::tempdir().unwrap();
        let session = FakeSession::new();
        session.element("late", FakeElement::new("div"));
        session.answer(css::structural(".late"), &["late"]);
        session.delay_query(css::structural(".late"), 2);
        let harness = harness(session, root.path());

        let found = harness.locate(".late", Scope::Document).await.unwrap();
        assert_eq!(found, vec![ElementRef::new("late")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_unreliable_accepts_empty() {
        let root = tempfile::tempdir().unwrap();
        let harness = harness(FakeSession::new(), root.path());

        let started = tokio::time::Instant::now();
        let found = harness.locate_unreliable("#gone", Scope::Document).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_one_strict_and_tolerant() {
        let root = tempfile::tempdir().unwrap();
        let session = FakeSession::new();
        session.element("a", FakeElement::new("li"));
        session.element("b", FakeElement::new("li"));
        session.answer(css::structural("li"), &["a", "b"]);
        let harness = harness(session, root.path());

        let err = harness.locate_one("li", Scope::Document, true).await.unwrap_err();
        assert!(matches!(err, HarnessError::Ambiguous { .. }));

        let first = harness.locate_one("li", Scope::Document, false).await.unwrap();
        assert_eq!(first, Some(ElementRef::new("a")));
    }

    #[tokio::test]
    async fn test_explicit_context_wins_over_thread_name() {
        let root = tempfile::tempdir().unwrap();
        let harness = harness(FakeSession::new(), root.path());
        assert_eq!(
            harness.resolve_current_test(),
            TestIdentity::new("HarnessSuite", "case")
        );

        let ambient = Harness::new(FakeSession::new(), config_in(root.path()));
        assert_eq!(
            ambient.resolve_current_test().case.as_deref(),
            Some("test_explicit_context_wins_over_thread_name")
        );
    }
}

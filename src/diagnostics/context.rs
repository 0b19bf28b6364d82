/// Which test produced a failure. Either half may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestIdentity {
    pub suite: Option<String>,
    pub case: Option<String>,
}

impl TestIdentity {
    pub fn new(suite: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            suite: Some(suite.into()),
            case: Some(case.into()),
        }
    }

    pub fn is_known(&self) -> bool {
        self.suite.is_some() || self.case.is_some()
    }
}

/// Identity supplied by the test itself when it builds its harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestContext {
    pub suite: String,
    pub case: String,
}

impl TestContext {
    pub fn new(suite: impl Into<String>, case: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            case: case.into(),
        }
    }

    pub fn identity(&self) -> TestIdentity {
        TestIdentity::new(self.suite.clone(), self.case.clone())
    }
}

/// Discover the running test from the current thread.
///
/// The Rust test runner executes every test on a thread named after the
/// test's path, e.g. `checkout::tests::pays_with_card`. Outside a test run
/// the identity is empty.
pub fn resolve_current_test() -> TestIdentity {
    std::thread::current()
        .name()
        .map(identity_from_thread_name)
        .unwrap_or_default()
}

pub fn identity_from_thread_name(name: &str) -> TestIdentity {
    let name = name.trim();
    if name.is_empty() || name == "main" || name.starts_with("tokio-") {
        return TestIdentity::default();
    }

    match name.rsplit_once("::") {
        Some((suite, case)) if !suite.is_empty() && !case.is_empty() => {
            TestIdentity::new(suite, case)
        }
        Some(_) => TestIdentity::default(),
        None => TestIdentity {
            suite: None,
            case: Some(name.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_splits_at_last_separator() {
        let identity = identity_from_thread_name("harness::tests::test_click_retries");
        assert_eq!(identity.suite.as_deref(), Some("harness::tests"));
        assert_eq!(identity.case.as_deref(), Some("test_click_retries"));
    }

    #[test]
    fn test_bare_name_is_case_only() {
        let identity = identity_from_thread_name("login_works");
        assert_eq!(identity.suite, None);
        assert_eq!(identity.case.as_deref(), Some("login_works"));
    }

    #[test]
    fn test_non_test_threads_are_unknown() {
        assert!(!identity_from_thread_name("main").is_known());
        assert!(!identity_from_thread_name("tokio-runtime-worker").is_known());
        assert!(!identity_from_thread_name("").is_known());
        assert!(!identity_from_thread_name("::").is_known());
    }

    #[test]
    fn test_resolves_the_running_test() {
        let identity = resolve_current_test();
        assert_eq!(identity.case.as_deref(), Some("test_resolves_the_running_test"));
        assert!(identity
            .suite
            .as_deref()
            .is_some_and(|s| s.ends_with("context::tests")));
    }

    #[test]
    fn test_explicit_context_identity() {
        let context = TestContext::new("Checkout", "pays_with_card");
        assert_eq!(context.identity(), TestIdentity::new("Checkout", "pays_with_card"));
    }
}

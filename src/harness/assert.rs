use regex::Regex;
use std::sync::Mutex;

use super::act::{not_found, path_and_query};
use super::Harness;
use crate::error::{FailureKind, Result};
use crate::session::{Scope, Session};

/// How an observed string is judged against what the test expects.
#[derive(Debug, Clone)]
pub enum Expect<'a> {
    Equals(&'a str),
    EqualsIgnoreCase(&'a str),
    NotEquals(&'a str),
    Matches(&'a Regex),
    NotMatches(&'a Regex),
}

impl Expect<'_> {
    pub fn accepts(&self, actual: &str) -> bool {
        match self {
            Expect::Equals(expected) => actual == *expected,
            Expect::EqualsIgnoreCase(expected) => actual.to_lowercase() == expected.to_lowercase(),
            Expect::NotEquals(expected) => actual != *expected,
            Expect::Matches(re) => re.is_match(actual),
            Expect::NotMatches(re) => !re.is_match(actual),
        }
    }

    /// Missing attributes never equal or match anything.
    fn accepts_missing(&self) -> bool {
        matches!(self, Expect::NotEquals(_) | Expect::NotMatches(_))
    }

    fn expected(&self) -> String {
        match self {
            Expect::Equals(s) | Expect::EqualsIgnoreCase(s) | Expect::NotEquals(s) => s.to_string(),
            Expect::Matches(re) | Expect::NotMatches(re) => re.as_str().to_string(),
        }
    }
}

impl<S: Session> Harness<S> {
    /// At least one match of `selector` is visible.
    pub async fn assert_displayed(&self, selector: &str) -> Result<()> {
        self.await_bool(self.config.element_timeout(), move || async move {
            for element in self.scan(selector, Scope::Document).await {
                match self.session.is_displayed(&element).await {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(e) => tracing::trace!("Visibility of {} unknown: {}", element, e),
                }
            }
            Ok(false)
        })
        .await
        .map(drop)
        .map_err(|e| {
            e.or_failed(FailureKind::Displayed, || {
                format!("Displayed check failed for {}", selector)
            })
        })
    }

    /// Nothing matching `selector` is visible, including nothing matching.
    pub async fn assert_not_displayed(&self, selector: &str) -> Result<()> {
        self.await_bool(self.config.compare_timeout(), move || async move {
            for element in self.scan(selector, Scope::Document).await {
                if self.session.is_displayed(&element).await? {
                    return Ok(false);
                }
            }
            Ok(true)
        })
        .await
        .map(drop)
        .map_err(|e| {
            e.or_failed(FailureKind::NotDisplayed, || {
                format!("NotDisplayed check failed for {}", selector)
            })
        })
    }

    pub async fn assert_enabled(&self, selector: &str) -> Result<()> {
        self.assert_enabled_state(selector, true).await
    }

    pub async fn assert_disabled(&self, selector: &str) -> Result<()> {
        self.assert_enabled_state(selector, false).await
    }

    async fn assert_enabled_state(&self, selector: &str, enabled: bool) -> Result<()> {
        self.await_bool(self.config.compare_timeout(), move || async move {
            let element = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
            Ok(self.session.is_enabled(&element).await? == enabled)
        })
        .await
        .map(drop)
        .map_err(|e| {
            let (kind, word) = if enabled {
                (FailureKind::Enabled, "Enabled")
            } else {
                (FailureKind::Disabled, "Disabled")
            };
            e.or_failed(kind, || format!("{} check failed for {}", word, selector))
        })
    }

    pub async fn assert_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class_state(selector, class_name, true).await
    }

    pub async fn assert_no_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class_state(selector, class_name, false).await
    }

    async fn assert_class_state(&self, selector: &str, class_name: &str, present: bool) -> Result<()> {
        self.await_bool(self.config.compare_timeout(), move || async move {
            let element = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
            let classes = self.session.attribute(&element, "class").await?.unwrap_or_default();
            let has = classes.split_whitespace().any(|c| c == class_name);
            Ok(has == present)
        })
        .await
        .map(drop)
        .map_err(|e| {
            if present {
                e.or_failed(FailureKind::Class, || {
                    format!("{} is not present on {}", class_name, selector)
                })
            } else {
                e.or_failed(FailureKind::NoClass, || {
                    format!("{} is present on {}", class_name, selector)
                })
            }
        })
    }

    /// Compare the user-visible value of the first match (see
    /// [`Harness::text_of`]).
    pub async fn assert_value(&self, selector: &str, expect: Expect<'_>) -> Result<()> {
        let last = Mutex::new(String::new());
        let (last_ref, expect_ref) = (&last, &expect);
        let result = self
            .await_bool(self.config.compare_timeout(), move || async move {
                let element = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
                let actual = self.text_of(&element).await?;
                Ok(observe(expect_ref, last_ref, actual))
            })
            .await;

        result.map(drop).map_err(|e| {
            e.or_failed(FailureKind::Value, || match &expect {
                Expect::NotEquals(expected) => format!(
                    "Value not equals comparison failed for {}. Expected anything other than: {}",
                    selector, expected
                ),
                _ => format!(
                    "Value comparison failed for {}. Expected: {}, Got: {}",
                    selector,
                    expect.expected(),
                    recall(&last)
                ),
            })
        })
    }

    pub async fn assert_value_equals(&self, selector: &str, expected: &str) -> Result<()> {
        self.assert_value(selector, Expect::Equals(expected)).await
    }

    pub async fn assert_value_not_equals(&self, selector: &str, expected: &str) -> Result<()> {
        self.assert_value(selector, Expect::NotEquals(expected)).await
    }

    pub async fn assert_value_matches(&self, selector: &str, re: &Regex) -> Result<()> {
        self.assert_value(selector, Expect::Matches(re)).await
    }

    pub async fn assert_value_not_matches(&self, selector: &str, re: &Regex) -> Result<()> {
        self.assert_value(selector, Expect::NotMatches(re)).await
    }

    pub async fn assert_attribute(
        &self,
        selector: &str,
        attribute: &str,
        expect: Expect<'_>,
    ) -> Result<()> {
        let last = Mutex::new(String::new());
        let (last_ref, expect_ref) = (&last, &expect);
        self.await_bool(self.config.compare_timeout(), move || async move {
            let element = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
            let accepted = match self.session.attribute(&element, attribute).await? {
                Some(actual) => observe(expect_ref, last_ref, actual),
                None => expect_ref.accepts_missing(),
            };
            Ok(accepted)
        })
        .await
        .map(drop)
        .map_err(|e| {
            e.or_failed(FailureKind::Value, || {
                format!(
                    "Attribute comparison failed for {}. Expected: {}, Got: {}",
                    selector,
                    expect.expected(),
                    recall(&last)
                )
            })
        })
    }

    /// Compare the path and query of the current URL.
    pub async fn assert_url(&self, expect: Expect<'_>) -> Result<()> {
        let last = Mutex::new(String::new());
        let (last_ref, expect_ref) = (&last, &expect);
        self.await_bool(self.config.page_timeout(), move || async move {
            let actual = path_and_query(&self.session.current_url().await?);
            Ok(observe(expect_ref, last_ref, actual))
        })
        .await
        .map(drop)
        .map_err(|e| {
            e.or_failed(FailureKind::Url, || {
                format!(
                    "Url comparison failed. Expected: {}, Got: {}",
                    expect.expected(),
                    recall(&last)
                )
            })
        })
    }

    pub async fn assert_title(&self, expect: Expect<'_>) -> Result<()> {
        let last = Mutex::new(String::new());
        let (last_ref, expect_ref) = (&last, &expect);
        self.await_bool(self.config.page_timeout(), move || async move {
            let actual = self.session.title().await?;
            Ok(observe(expect_ref, last_ref, actual))
        })
        .await
        .map(drop)
        .map_err(|e| {
            e.or_failed(FailureKind::Title, || {
                format!(
                    "Title comparison failed. Expected: {}, Got: {}",
                    expect.expected(),
                    recall(&last)
                )
            })
        })
    }

}

fn observe(expect: &Expect<'_>, last: &Mutex<String>, actual: String) -> bool {
    let accepted = expect.accepts(&actual);
    if !accepted {
        remember(last, actual);
    }
    accepted
}

fn remember(last: &Mutex<String>, value: String) {
    if let Ok(mut slot) = last.lock() {
        *slot = value;
    }
}

fn recall(last: &Mutex<String>) -> String {
    last.lock().map(|s| s.clone()).unwrap_or_default()
}

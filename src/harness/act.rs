use std::future::Future;
use std::time::Duration;

use super::Harness;
use crate::error::{FailureKind, HarnessError, Result};
use crate::selectors::{css, xpath::xpath_literal};
use crate::session::{ElementRef, Modifiers, Query, Scope, Session};
use crate::wait::Attempt;

/// Which matches a click may land on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOptions {
    /// Stop after the first element that accepts the click.
    pub first_only: bool,
    pub include_disabled: bool,
    pub include_hidden: bool,
}

impl<S: Session> Harness<S> {
    pub async fn goto(&self, url: &str) -> Result<()> {
        Ok(self.session.goto(url).await?)
    }

    pub async fn back(&self) -> Result<()> {
        Ok(self.session.back().await?)
    }

    pub async fn forward(&self) -> Result<()> {
        Ok(self.session.forward().await?)
    }

    pub async fn refresh(&self) -> Result<()> {
        Ok(self.session.refresh().await?)
    }

    /// Path and query of the current page, e.g. `/search?q=rust`.
    pub async fn current_path(&self) -> Result<String> {
        let url = self.session.current_url().await?;
        Ok(path_and_query(&url))
    }

    /// Apply `action` to every match of `selector` until at least one
    /// element accepts it. Per-element errors count as "not accepted".
    pub(crate) async fn for_each_match<F, Fut>(
        &self,
        selector: &str,
        budget: Duration,
        stop_after_first: bool,
        action: F,
    ) -> Result<()>
    where
        F: Fn(ElementRef) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let action = &action;
        self.retry(budget, move || async move {
            let mut accepted = false;
            for element in self.scan(selector, Scope::Document).await {
                match action(element.clone()).await {
                    Ok(true) => {
                        accepted = true;
                        if stop_after_first {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) if e.is_timeout() => return Attempt::Fatal(e),
                    Err(e) => tracing::trace!("{} rejected action: {}", element, e),
                }
            }
            if accepted {
                Attempt::Ready(())
            } else {
                Attempt::Pending
            }
        })
        .await
    }

    /// Whether `element` may be acted on under `options`.
    async fn actionable(&self, element: &ElementRef, options: ClickOptions) -> Result<bool> {
        let enabled = options.include_disabled || self.session.is_enabled(element).await?;
        let displayed = options.include_hidden || self.session.is_displayed(element).await?;
        Ok(enabled && displayed)
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        self.click_with(selector, ClickOptions::default()).await
    }

    pub async fn click_with(&self, selector: &str, options: ClickOptions) -> Result<()> {
        let result = self
            .for_each_match(
                selector,
                self.config.element_timeout(),
                options.first_only,
                move |element| async move {
                    if !self.actionable(&element, options).await? {
                        return Ok(false);
                    }
                    self.session.click(&element).await?;
                    Ok(true)
                },
            )
            .await
            .map_err(|e| {
                e.or_failed(FailureKind::Click, || {
                    format!("Timed out trying to click {}", selector)
                })
            });
        tokio::time::sleep(self.config.animation_wait()).await;
        result
    }

    pub async fn double_click(&self, selector: &str) -> Result<()> {
        self.for_each_match(
            selector,
            self.config.element_timeout(),
            false,
            move |element| async move {
                self.session.double_click(&element).await?;
                Ok(true)
            },
        )
        .await
        .map_err(|e| {
            e.or_failed(FailureKind::Click, || {
                format!("Timed out trying to double click {}", selector)
            })
        })
    }

    /// Tick every enabled, visible checkbox or radio matching `selector`.
    pub async fn check(&self, selector: &str) -> Result<()> {
        self.set_checked(selector, true, ClickOptions::default()).await
    }

    pub async fn uncheck(&self, selector: &str) -> Result<()> {
        self.set_checked(selector, false, ClickOptions::default()).await
    }

    pub async fn set_checked(
        &self,
        selector: &str,
        checked: bool,
        options: ClickOptions,
    ) -> Result<()> {
        let result = self
            .for_each_match(
                selector,
                self.config.element_timeout(),
                false,
                move |element| async move {
                    if !self.actionable(&element, options).await? {
                        return Ok(false);
                    }
                    if self.session.is_selected(&element).await? != checked {
                        self.session.click(&element).await?;
                    }
                    Ok(self.session.is_selected(&element).await? == checked)
                },
            )
            .await;
        tokio::time::sleep(self.config.animation_wait()).await;
        result.map_err(|e| {
            let verb = if checked { "check" } else { "uncheck" };
            e.or_failed(FailureKind::Click, || {
                format!("Timed out trying to {} {}", verb, selector)
            })
        })
    }

    pub async fn write(&self, selector: &str, text: &str) -> Result<()> {
        self.write_with(selector, text, Modifiers::default()).await
    }

    /// Type `text` into every writable match, or pick the matching option
    /// when the match is a `<select>`.
    pub async fn write_with(&self, selector: &str, text: &str, modifiers: Modifiers) -> Result<()> {
        self.for_each_match(
            selector,
            self.config.element_timeout(),
            false,
            move |element| async move {
                self.write_to_element(&element, text, modifiers).await?;
                Ok(true)
            },
        )
        .await
        .map_err(|e| {
            e.or_failed(FailureKind::Write, || {
                format!("Timed out trying to write '{}' to {}", text, selector)
            })
        })
    }

    async fn write_to_element(
        &self,
        element: &ElementRef,
        text: &str,
        modifiers: Modifiers,
    ) -> Result<()> {
        if self.session.tag_name(element).await? == "select" {
            return self.write_to_select(element, text).await;
        }

        if self.session.attribute(element, "readonly").await?.is_some() {
            return Err(HarnessError::ReadOnly {
                element: element.to_string(),
            });
        }

        if !self.config.optimize_by_disabling_clear_before_write {
            if let Err(e) = self.session.clear(element).await {
                tracing::trace!("Clearing {} failed: {}", element, e);
            }
        }

        self.session
            .send_keys(element, text, modifiers, self.config.single_character_entry)
            .await?;
        Ok(())
    }

    async fn write_to_select(&self, select: &ElementRef, text: &str) -> Result<()> {
        let query = option_query(text, self.config.write_to_select_with_option_value);
        let options = self.session.find(Scope::Within(select), &query).await?;
        let option = options.first().ok_or_else(|| HarnessError::OptionNotFound {
            element: select.to_string(),
            value: text.to_string(),
        })?;
        self.session.click(option).await?;
        Ok(())
    }

    /// The value a user would see in the first match of `selector`.
    pub async fn read(&self, selector: &str) -> Result<String> {
        self.await_value(self.config.compare_timeout(), move || async move {
            match self.scan_one(selector).await? {
                Some(element) => self.text_of(&element).await,
                None => Err(not_found(selector)),
            }
        })
        .await
    }

    /// Form value for inputs and textareas, the selected option's text for
    /// selects, rendered text otherwise.
    pub async fn text_of(&self, element: &ElementRef) -> Result<String> {
        match self.session.tag_name(element).await?.as_str() {
            "input" | "textarea" => Ok(self
                .session
                .attribute(element, "value")
                .await?
                .unwrap_or_default()),
            "select" => {
                let value = self.session.attribute(element, "value").await?;
                let options = self
                    .session
                    .find(Scope::Within(element), &Query::Css("option".to_string()))
                    .await?;
                for option in &options {
                    if self.session.attribute(option, "value").await? == value {
                        return Ok(self.session.text(option).await?);
                    }
                }
                Err(HarnessError::OptionNotFound {
                    element: element.to_string(),
                    value: value.unwrap_or_default(),
                })
            }
            _ => Ok(self.session.text(element).await?),
        }
    }

    pub async fn hover(&self, selector: &str) -> Result<()> {
        self.await_value(self.config.element_timeout(), move || async move {
            let element = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
            self.session.hover(&element).await.map_err(HarnessError::from)
        })
        .await
        .map_err(|e| {
            e.or_failed(FailureKind::Hover, || {
                format!("Failed to Hover over element {}", selector)
            })
        })
    }

    pub async fn select_by_value(&self, selector: &str, value: &str) -> Result<()> {
        let query = Query::Css(format!("option[value={}]", css::css_string(value)));
        self.select_option(selector, query, None)
            .await
            .map_err(|e| {
                e.or_failed(FailureKind::SelectOption, || {
                    format!("Failed to select value {} from {}", value, selector)
                })
            })
    }

    pub async fn select_by_text(&self, selector: &str, text: &str) -> Result<()> {
        let query = Query::XPath(format!(
            ".//option[normalize-space(.)={}]",
            xpath_literal(text.trim())
        ));
        self.select_option(selector, query, None)
            .await
            .map_err(|e| {
                e.or_failed(FailureKind::SelectOption, || {
                    format!("Failed to select text {} from {}", text, selector)
                })
            })
    }

    pub async fn select_by_index(&self, selector: &str, index: usize) -> Result<()> {
        let query = Query::Css("option".to_string());
        self.select_option(selector, query, Some(index))
            .await
            .map_err(|e| {
                e.or_failed(FailureKind::SelectOption, || {
                    format!("Failed to select index {} from {}", index, selector)
                })
            })
    }

    async fn select_option(&self, selector: &str, query: Query, index: Option<usize>) -> Result<()> {
        let query = &query;
        self.await_value(self.config.element_timeout(), move || async move {
            let select = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
            let options = self.session.find(Scope::Within(&select), query).await?;
            let option = options
                .get(index.unwrap_or(0))
                .ok_or_else(|| HarnessError::OptionNotFound {
                    element: selector.to_string(),
                    value: query.to_string(),
                })?;
            self.session.click(option).await.map_err(HarnessError::from)
        })
        .await
    }

    /// Direct children of the first match of `selector`.
    pub async fn children(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.retry(self.config.element_timeout(), move || async move {
            let parent = match self.scan_one(selector).await {
                Ok(Some(parent)) => parent,
                Ok(None) => return Attempt::Pending,
                Err(e) => return Attempt::from_result(Err(e)),
            };
            match self
                .session
                .find(Scope::Within(&parent), &Query::XPath("*".to_string()))
                .await
            {
                Ok(children) if !children.is_empty() => Attempt::Ready(children),
                Ok(_) => Attempt::Pending,
                Err(e) => Attempt::from_result(Err(e.into())),
            }
        })
        .await
        .map_err(|e| {
            e.or_failed(FailureKind::NoChildren, || {
                format!("Unable to locate children elements of {}", selector)
            })
        })
    }

    /// How many elements currently match `selector`; zero is a valid answer.
    pub async fn occurrences(&self, selector: &str) -> Result<usize> {
        Ok(self.locate_unreliable(selector, Scope::Document).await?.len())
    }

    /// Wait for `attribute` to be present on the first match and return it.
    pub async fn attribute_value(&self, selector: &str, attribute: &str) -> Result<String> {
        self.await_value(self.config.compare_timeout(), move || async move {
            let element = self.scan_one(selector).await?.ok_or_else(|| not_found(selector))?;
            self.session
                .attribute(&element, attribute)
                .await?
                .ok_or_else(|| {
                    HarnessError::Session(anyhow::anyhow!(
                        "{} has no attribute {}",
                        element,
                        attribute
                    ))
                })
        })
        .await
        .map_err(|e| {
            e.or_failed(FailureKind::AttributeNotFound, || {
                format!("Attribute: {}, was not found on {}", attribute, selector)
            })
        })
    }
}

pub(crate) fn not_found(selector: &str) -> HarnessError {
    HarnessError::Session(anyhow::anyhow!("no element matches {}", selector))
}

/// Options of a select whose text (or, when allowed, value) equals `text`.
fn option_query(text: &str, match_value: bool) -> Query {
    let lit = xpath_literal(text);
    let expr = if match_value {
        format!(
            "option[normalize-space(text())={lit}] | option[@value={lit}] | \
             optgroup/option[normalize-space(text())={lit}] | optgroup/option[@value={lit}]",
            lit = lit
        )
    } else {
        format!(
            "option[normalize-space(text())={lit}] | optgroup/option[normalize-space(text())={lit}]",
            lit = lit
        )
    };
    Query::XPath(expr)
}

pub(crate) fn path_and_query(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

//! Polling waits over browser state

use crate::browser::{Browser, BrowserError, BrowserResult, Selector};
use crate::error::{EvisionError, Result};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Result of a wait that is allowed to run out of time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Satisfied(T),
    TimedOut,
}

impl<T> WaitOutcome<T> {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Satisfied(value) => Some(value),
            Self::TimedOut => None,
        }
    }

    /// Treat running out of time as fatal
    pub fn required(self, what: impl Into<String>, after: Option<Duration>) -> Result<T> {
        match self {
            Self::Satisfied(value) => Ok(value),
            Self::TimedOut => Err(EvisionError::timeout(what, after)),
        }
    }
}

/// A predicate over the page in the current window
#[derive(Debug, Clone)]
pub enum Condition<E> {
    /// At least one element matches
    Present(Selector),
    /// At least one matching element is displayed
    Visible(Selector),
    /// No matching element is displayed (absent elements count as invisible)
    Invisible(Selector),
    /// The element has been removed from the document
    Stale(E),
    /// The first matching element's text contains the string
    TextPresent(Selector, String),
    TitleIs(String),
    AllOf(Vec<Condition<E>>),
    AnyOf(Vec<Condition<E>>),
    NoneOf(Vec<Condition<E>>),
}

pub fn present<E>(selector: Selector) -> Condition<E> {
    Condition::Present(selector)
}

pub fn visible<E>(selector: Selector) -> Condition<E> {
    Condition::Visible(selector)
}

pub fn invisible<E>(selector: Selector) -> Condition<E> {
    Condition::Invisible(selector)
}

pub fn stale<E>(element: E) -> Condition<E> {
    Condition::Stale(element)
}

pub fn text_present<E>(selector: Selector, text: impl Into<String>) -> Condition<E> {
    Condition::TextPresent(selector, text.into())
}

pub fn title_is<E>(title: impl Into<String>) -> Condition<E> {
    Condition::TitleIs(title.into())
}

pub fn all_of<E>(conditions: Vec<Condition<E>>) -> Condition<E> {
    Condition::AllOf(conditions)
}

pub fn any_of<E>(conditions: Vec<Condition<E>>) -> Condition<E> {
    Condition::AnyOf(conditions)
}

pub fn none_of<E>(conditions: Vec<Condition<E>>) -> Condition<E> {
    Condition::NoneOf(conditions)
}

impl<E: Clone + Send + Sync> Condition<E> {
    /// Evaluate once against the current window.
    ///
    /// Inside the combinators a transient error counts as "does not hold".
    pub fn evaluate<'a, B>(&'a self, browser: &'a B) -> BoxFuture<'a, BrowserResult<bool>>
    where
        B: Browser<Element = E>,
    {
        async move {
            match self {
                Self::Present(selector) => Ok(!browser.find_all(selector).await?.is_empty()),
                Self::Visible(selector) => any_displayed(browser, selector).await,
                Self::Invisible(selector) => match any_displayed(browser, selector).await {
                    Ok(displayed) => Ok(!displayed),
                    Err(BrowserError::StaleElement(_)) | Err(BrowserError::NoSuchElement(_)) => Ok(true),
                    Err(e) => Err(e),
                },
                Self::Stale(element) => match browser.is_displayed(element).await {
                    Ok(_) => Ok(false),
                    Err(BrowserError::StaleElement(_)) => Ok(true),
                    Err(e) => Err(e),
                },
                Self::TextPresent(selector, text) => match browser.find(selector).await? {
                    Some(element) => Ok(browser.text(&element).await?.contains(text.as_str())),
                    None => Ok(false),
                },
                Self::TitleIs(title) => Ok(browser.title().await? == *title),
                Self::AllOf(conditions) => {
                    for condition in conditions {
                        if !holds(condition.evaluate(browser).await)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                Self::AnyOf(conditions) => {
                    for condition in conditions {
                        if holds(condition.evaluate(browser).await)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                Self::NoneOf(conditions) => {
                    for condition in conditions {
                        if holds(condition.evaluate(browser).await)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
            }
        }
        .boxed()
    }
}

impl<E> Condition<E> {
    /// Human readable description for timeout messages
    pub fn describe(&self) -> String {
        let join = |conditions: &[Condition<E>]| {
            conditions
                .iter()
                .map(Condition::describe)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match self {
            Self::Present(s) => format!("presence of {}", s),
            Self::Visible(s) => format!("visibility of {}", s),
            Self::Invisible(s) => format!("invisibility of {}", s),
            Self::Stale(_) => "staleness of element".to_string(),
            Self::TextPresent(s, text) => format!("text {:?} in {}", text, s),
            Self::TitleIs(title) => format!("title {:?}", title),
            Self::AllOf(cs) => format!("all of [{}]", join(cs)),
            Self::AnyOf(cs) => format!("any of [{}]", join(cs)),
            Self::NoneOf(cs) => format!("none of [{}]", join(cs)),
        }
    }
}

fn holds(result: BrowserResult<bool>) -> BrowserResult<bool> {
    match result {
        Err(e) if e.is_transient() => Ok(false),
        other => other,
    }
}

async fn any_displayed<B: Browser>(browser: &B, selector: &Selector) -> BrowserResult<bool> {
    for element in browser.find_all(selector).await? {
        if browser.is_displayed(&element).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Polls a check until it yields a value or the timeout elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waiter {
    timeout: Option<Duration>,
    interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            interval,
        }
    }

    /// Never times out
    pub fn indefinitely(interval: Duration) -> Self {
        Self {
            timeout: None,
            interval,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Wait for a condition in the current window
    pub async fn until<B: Browser>(
        &self,
        browser: &B,
        condition: &Condition<B::Element>,
    ) -> Result<WaitOutcome<()>> {
        self.until_some(move || async move {
            Ok(condition.evaluate(browser).await?.then_some(()))
        })
        .await
    }

    /// Like [`Waiter::until`] but fatal on timeout
    pub async fn require<B: Browser>(
        &self,
        browser: &B,
        condition: &Condition<B::Element>,
    ) -> Result<()> {
        self.until(browser, condition)
            .await?
            .required(condition.describe(), self.timeout)
    }

    /// Poll `check` until it returns `Some`.
    ///
    /// The check always runs at least once. Transient errors are treated as
    /// "not yet"; any other error ends the wait.
    pub async fn until_some<T, F, Fut>(&self, mut check: F) -> Result<WaitOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        loop {
            match check().await {
                Ok(Some(value)) => return Ok(WaitOutcome::Satisfied(value)),
                Ok(None) => {}
                Err(e) if e.is_transient() => log::trace!("Ignoring transient error while waiting: {}", e),
                Err(e) => return Err(e),
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(WaitOutcome::TimedOut);
                    }
                    self.interval.min(deadline - now)
                }
                None => self.interval,
            };
            tokio::time::sleep(pause).await;
        }
    }
}

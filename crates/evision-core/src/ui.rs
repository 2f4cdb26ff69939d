//! Robust interactions with the eVision pages
//!
//! eVision redraws pages behind our back, covers them with dialogs and opens
//! popup windows. The helpers here absorb that and only surface errors once
//! their retries are used up.

use crate::browser::{Browser, BrowserError, Selector};
use crate::config::EvisionConfig;
use crate::error::{EvisionError, Result};
use crate::overlay::dismiss_overlay;
use crate::screens::locators;
use crate::wait::{present, Condition, WaitOutcome, Waiter};
use evision_types::WindowHandle;
use std::collections::HashSet;
use std::time::Duration;

pub struct Ui<'a, B: Browser> {
    browser: &'a B,
    config: &'a EvisionConfig,
    /// Window to return to when a popup closes
    home: Option<&'a WindowHandle>,
}

enum Opened {
    Expected,
    NewWindow(WindowHandle),
}

impl<'a, B: Browser> Ui<'a, B> {
    pub fn new(browser: &'a B, config: &'a EvisionConfig, home: Option<&'a WindowHandle>) -> Self {
        Self {
            browser,
            config,
            home,
        }
    }

    pub fn browser(&self) -> &'a B {
        self.browser
    }

    pub fn config(&self) -> &'a EvisionConfig {
        self.config
    }

    pub fn wait(&self, timeout: Duration) -> Waiter {
        Waiter::new(timeout, self.config.timeouts.poll_interval())
    }

    pub fn wait_indefinitely(&self) -> Waiter {
        Waiter::indefinitely(self.config.timeouts.poll_interval())
    }

    /// First element matching `selector`, waiting up to `timeout` for it
    pub async fn find(&self, selector: &Selector, timeout: Duration) -> Result<B::Element> {
        let browser = self.browser;
        self.wait(timeout)
            .until_some(move || async move { Ok(browser.find(selector).await?) })
            .await?
            .required(format!("presence of {}", selector), Some(timeout))
    }

    /// Text of the first element matching `selector`
    pub async fn text_of(&self, selector: &Selector, timeout: Duration) -> Result<String> {
        let element = self.find(selector, timeout).await?;
        Ok(self.browser.text(&element).await?)
    }

    /// Click an element, getting past any overlay that intercepts the click
    pub async fn click(&self, selector: &Selector) -> Result<()> {
        let short = self.config.timeouts.short();
        let overlay_wait = self.wait(self.config.timeouts.long());
        let mut last_error = None;

        for attempt in 1..=self.config.click_attempts {
            let element = self.find(selector, short).await?;
            match self.browser.click(&element).await {
                Ok(()) => return Ok(()),
                Err(e @ BrowserError::ClickIntercepted(_)) => {
                    log::debug!("Click on {} intercepted (attempt {})", selector, attempt);
                    dismiss_overlay(self.browser, &overlay_wait).await?;
                    last_error = Some(e);
                }
                Err(e @ BrowserError::StaleElement(_)) => {
                    log::debug!("{} went stale before it was clicked (attempt {})", selector, attempt);
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        log::error!("Giving up on clicking {} after {} attempts", selector, self.config.click_attempts);
        Err(last_error
            .unwrap_or_else(|| BrowserError::ClickIntercepted(selector.to_string()))
            .into())
    }

    /// Select one of the tabs in the application window
    pub async fn activate_tab(&self, label: &str) -> Result<()> {
        let anchor = locators::tab_anchor(label);
        let selected = present(locators::selected_tab(label));
        let short = self.config.timeouts.short();

        for attempt in 1..=self.config.tab_attempts {
            match self.click(&anchor).await {
                Ok(()) => {}
                Err(e) if e.is_timeout() => {
                    log::warn!("Tab {:?} not found (attempt {}): {}", label, attempt, e);
                    continue;
                }
                Err(e) => return Err(e),
            }
            match self.wait(short).until(self.browser, &selected).await? {
                WaitOutcome::Satisfied(()) => {
                    log::debug!("Activated tab {:?}", label);
                    return Ok(());
                }
                WaitOutcome::TimedOut => {
                    log::warn!("Tab {:?} was not selected (attempt {})", label, attempt);
                }
            }
        }

        Err(EvisionError::timeout(format!("tab {:?} to be selected", label), Some(short)))
    }

    /// Click `trigger` (if any) and wait until a window satisfying
    /// `expectation` is in front.
    ///
    /// Every newly opened window is switched to and checked. The trigger is
    /// clicked only once, and the timeout restarts whenever a window that does
    /// not satisfy the expectation opens.
    pub async fn open_window(
        &self,
        trigger: Option<&Selector>,
        expectation: &Condition<B::Element>,
        timeout: Option<Duration>,
    ) -> Result<WindowHandle> {
        let browser = self.browser;
        let mut known: HashSet<WindowHandle> = browser.window_handles().await?.into_iter().collect();

        if let Some(trigger) = trigger {
            self.click(trigger).await?;
        }

        let waiter = match timeout {
            Some(timeout) => self.wait(timeout),
            None => self.wait_indefinitely(),
        };

        loop {
            let seen = &known;
            let outcome = waiter
                .until_some(move || async move {
                    if expectation.evaluate(browser).await? {
                        return Ok(Some(Opened::Expected));
                    }
                    let handles = browser.window_handles().await?;
                    Ok(handles
                        .into_iter()
                        .find(|h| !seen.contains(h))
                        .map(Opened::NewWindow))
                })
                .await?;

            match outcome {
                WaitOutcome::Satisfied(Opened::Expected) => return Ok(browser.current_window().await?),
                WaitOutcome::Satisfied(Opened::NewWindow(handle)) => {
                    log::debug!("Switching to new window {}", handle);
                    browser.switch_to_window(&handle).await?;
                    known.insert(handle);
                }
                WaitOutcome::TimedOut => {
                    return Err(EvisionError::timeout(expectation.describe(), timeout));
                }
            }
        }
    }

    /// Click `trigger`, wait for the current window to close, then switch
    /// back to the home window (or whichever window remains).
    pub async fn close_window(&self, trigger: &Selector) -> Result<WindowHandle> {
        let browser = self.browser;
        let before = browser.window_handles().await?;
        let count = before.len();

        self.click(trigger).await?;

        let timeout = self.config.timeouts.window_close();
        let remaining = self
            .wait(timeout)
            .until_some(move || async move {
                let handles = browser.window_handles().await?;
                Ok((handles.len() < count).then_some(handles))
            })
            .await?
            .required("window to close", Some(timeout))?;

        let target = self
            .home
            .filter(|home| remaining.contains(*home))
            .cloned()
            .or_else(|| remaining.last().cloned())
            .ok_or_else(|| BrowserError::NoSuchWindow("no window left open".to_string()))?;

        browser.switch_to_window(&target).await?;
        log::debug!("Switched back to window {}", target);
        Ok(target)
    }
}

//! Modal overlays that intercept clicks
//!
//! eVision throws jQuery UI dialogs over the page while it is busy, and
//! occasionally to ask whether the page should be refreshed. Clicks that land
//! on such a dialog fail with an interception error.

use crate::browser::{Browser, BrowserError, Selector};
use crate::constants::{BUSY_OVERLAY_TITLES, REFRESH_DECLINE_BUTTON, REFRESH_OVERLAY_TITLE};
use crate::error::{EvisionError, Result};
use crate::wait::{stale, Waiter};
use std::fmt;

pub const OVERLAY_TITLE: Selector = Selector::css_const("div.ui-dialog .ui-dialog-title");
pub const OVERLAY_CONTENT: Selector = Selector::css_const("div.ui-dialog .ui-dialog-content");
pub const OVERLAY_BUTTONS: Selector = Selector::css_const("div.ui-dialog .ui-dialog-buttonset button");

/// What kind of dialog we are looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Goes away by itself once eVision is done
    Busy,
    /// Asks to refresh the page; answered with "No"
    RefreshPrompt,
    Unknown,
}

impl OverlayKind {
    pub fn recognize<'a>(title: &str, mut buttons: impl Iterator<Item = &'a str>) -> Self {
        if BUSY_OVERLAY_TITLES.contains(&title) {
            Self::Busy
        } else if title == REFRESH_OVERLAY_TITLE && buttons.any(|b| b == REFRESH_DECLINE_BUTTON) {
            Self::RefreshPrompt
        } else {
            Self::Unknown
        }
    }
}

/// Snapshot of the dialog currently on screen
pub struct ModalOverlay<E> {
    title_element: E,
    title: String,
    content: String,
    buttons: Vec<(String, E)>,
}

impl<E: Clone + Send + Sync> ModalOverlay<E> {
    /// Look for a dialog in the current window. A dialog that disappears
    /// while it is being read counts as absent.
    pub async fn find<B>(browser: &B) -> Result<Option<Self>>
    where
        B: Browser<Element = E>,
    {
        match Self::read(browser).await {
            Err(e) if e.is_transient() => Ok(None),
            other => other,
        }
    }

    async fn read<B>(browser: &B) -> Result<Option<Self>>
    where
        B: Browser<Element = E>,
    {
        let Some(title_element) = browser.find(&OVERLAY_TITLE).await? else {
            return Ok(None);
        };
        let title = browser.text(&title_element).await?.trim().to_string();

        let content = match browser.find(&OVERLAY_CONTENT).await? {
            Some(element) => browser.text(&element).await?.trim().to_string(),
            None => String::new(),
        };

        let mut buttons = Vec::new();
        for element in browser.find_all(&OVERLAY_BUTTONS).await? {
            let label = browser.text(&element).await?.trim().to_string();
            buttons.push((label, element));
        }

        Ok(Some(Self {
            title_element,
            title,
            content,
            buttons,
        }))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn button_labels(&self) -> impl Iterator<Item = &str> {
        self.buttons.iter().map(|(label, _)| label.as_str())
    }

    pub fn kind(&self) -> OverlayKind {
        OverlayKind::recognize(&self.title, self.button_labels())
    }

    /// Click a dialog button; a button that went stale is ignored
    pub async fn click_button<B>(&self, browser: &B, label: &str) -> Result<bool>
    where
        B: Browser<Element = E>,
    {
        let Some((_, button)) = self.buttons.iter().find(|(l, _)| l == label) else {
            return Ok(false);
        };
        match browser.click(button).await {
            Ok(()) => Ok(true),
            Err(BrowserError::StaleElement(_)) => {
                log::debug!("Overlay button {:?} went stale before it was clicked", label);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Wait until the dialog's title element leaves the document
    pub async fn wait_for_disappearance<B>(&self, browser: &B, waiter: &Waiter) -> Result<()>
    where
        B: Browser<Element = E>,
    {
        let gone = stale(self.title_element.clone());
        waiter
            .until(browser, &gone)
            .await?
            .required(format!("overlay {:?} to disappear", self.title), waiter.timeout())
    }

    /// Deal with the dialog if it is one we know.
    ///
    /// Returns `false` for dialogs we have no strategy for.
    pub async fn dismiss<B>(&self, browser: &B, waiter: &Waiter) -> Result<bool>
    where
        B: Browser<Element = E>,
    {
        match self.kind() {
            OverlayKind::Busy => {
                log::debug!("Waiting for {:?} overlay to go away", self.title);
                self.wait_for_disappearance(browser, waiter).await?;
                Ok(true)
            }
            OverlayKind::RefreshPrompt => {
                log::debug!("Declining to refresh the page");
                self.click_button(browser, REFRESH_DECLINE_BUTTON).await?;
                self.wait_for_disappearance(browser, waiter).await?;
                Ok(true)
            }
            OverlayKind::Unknown => Ok(false),
        }
    }
}

impl<E> fmt::Display for ModalOverlay<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.buttons.iter().map(|(label, _)| label.as_str()).collect();
        write!(f, "title={:?} content={:?} buttons={:?}", self.title, self.content, labels)
    }
}

/// Find and dismiss whatever overlay is intercepting clicks.
///
/// Succeeds when the overlay is gone (or was never found); fails with
/// [`EvisionError::UnrecognizedOverlay`] when there is no safe way past it.
pub async fn dismiss_overlay<B: Browser>(browser: &B, waiter: &Waiter) -> Result<()> {
    let Some(overlay) = ModalOverlay::find(browser).await? else {
        log::debug!("Click was intercepted but no overlay is showing; retrying");
        return Ok(());
    };

    if overlay.dismiss(browser, waiter).await? {
        Ok(())
    } else {
        log::error!("Don't know how to dismiss overlay: {}", overlay);
        Err(EvisionError::UnrecognizedOverlay(overlay.to_string()))
    }
}

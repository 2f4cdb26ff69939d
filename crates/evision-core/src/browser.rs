//! Browser capability used by the screens
//!
//! The robot only needs a small slice of WebDriver. Keeping it behind a trait
//! lets the screens run against Firefox in production and against a scripted
//! fake in tests.

use async_trait::async_trait;
use evision_types::WindowHandle;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Errors reported by a browser session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Element click intercepted: {0}")]
    ClickIntercepted(String),

    #[error("No such window: {0}")]
    NoSuchWindow(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl BrowserError {
    /// Errors caused by the page changing underneath us rather than by a broken session
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::NoSuchElement(_) | Self::StaleElement(_) | Self::ClickIntercepted(_)
        )
    }
}

pub type BrowserResult<T> = std::result::Result<T, BrowserError>;

/// How to locate elements on the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Anchor whose visible text equals the given text
    LinkText(Cow<'static, str>),
    /// Anchor whose visible text contains the given text
    PartialLinkText(Cow<'static, str>),
    XPath(Cow<'static, str>),
    Css(Cow<'static, str>),
}

impl Selector {
    pub const fn xpath_const(query: &'static str) -> Self {
        Self::XPath(Cow::Borrowed(query))
    }

    pub const fn css_const(query: &'static str) -> Self {
        Self::Css(Cow::Borrowed(query))
    }

    pub const fn link_text_const(text: &'static str) -> Self {
        Self::LinkText(Cow::Borrowed(text))
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Self::XPath(Cow::Owned(query.into()))
    }

    pub fn css(query: impl Into<String>) -> Self {
        Self::Css(Cow::Owned(query.into()))
    }

    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::PartialLinkText(Cow::Owned(text.into()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LinkText(s) | Self::PartialLinkText(s) | Self::XPath(s) | Self::Css(s) => s,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkText(s) => write!(f, "link text {:?}", s),
            Self::PartialLinkText(s) => write!(f, "partial link text {:?}", s),
            Self::XPath(s) => write!(f, "xpath {}", s),
            Self::Css(s) => write!(f, "css {}", s),
        }
    }
}

/// Quote a string for use inside an XPath expression.
///
/// XPath 1.0 has no escape sequences, so a string holding both quote kinds
/// is assembled with `concat()`.
pub fn xpath_literal(s: &str) -> String {
    if !s.contains('"') {
        return format!("\"{}\"", s);
    }
    if !s.contains('\'') {
        return format!("'{}'", s);
    }

    let parts: Vec<String> = s
        .split('"')
        .map(|part| format!("\"{}\"", part))
        .collect();
    format!("concat({})", parts.join(", '\"', "))
}

/// Cookie visible to the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Render cookies as the value of an HTTP `Cookie` header
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// WebDriver operations the robot relies on
#[async_trait]
pub trait Browser: Send + Sync {
    type Element: Clone + Send + Sync;

    async fn goto(&self, url: &str) -> BrowserResult<()>;

    /// All matching elements in the current window; empty when nothing matches
    async fn find_all(&self, selector: &Selector) -> BrowserResult<Vec<Self::Element>>;

    async fn find_all_within(
        &self,
        parent: &Self::Element,
        selector: &Selector,
    ) -> BrowserResult<Vec<Self::Element>>;

    async fn click(&self, element: &Self::Element) -> BrowserResult<()>;

    async fn text(&self, element: &Self::Element) -> BrowserResult<String>;

    async fn attr(&self, element: &Self::Element, name: &str) -> BrowserResult<Option<String>>;

    async fn is_displayed(&self, element: &Self::Element) -> BrowserResult<bool>;

    async fn title(&self) -> BrowserResult<String>;

    async fn window_handles(&self) -> BrowserResult<Vec<WindowHandle>>;

    async fn current_window(&self) -> BrowserResult<WindowHandle>;

    async fn switch_to_window(&self, handle: &WindowHandle) -> BrowserResult<()>;

    async fn cookies(&self) -> BrowserResult<Vec<Cookie>>;

    async fn user_agent(&self) -> BrowserResult<String>;

    /// End the session, closing every window
    async fn close(self) -> BrowserResult<()>
    where
        Self: Sized;

    /// First matching element, if any
    async fn find(&self, selector: &Selector) -> BrowserResult<Option<Self::Element>> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }
}

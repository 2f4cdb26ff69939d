//! Firefox driven through WebDriver

use crate::browser::{xpath_literal, Browser, BrowserError, BrowserResult, Cookie, Selector};
use crate::error::{EvisionError, Result};
use async_trait::async_trait;
use evision_types::WindowHandle;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;

/// A WebDriver session with Firefox
pub struct FirefoxBrowser {
    client: Client,
}

impl FirefoxBrowser {
    /// Open a new Firefox session on the WebDriver server at `webdriver_url`
    pub async fn connect(webdriver_url: &str) -> Result<Self> {
        let mut caps = serde_json::Map::new();
        caps.insert("browserName".to_string(), json!("firefox"));
        caps.insert("acceptInsecureCerts".to_string(), json!(false));

        log::debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(webdriver_url)
            .await
            .map_err(|e| EvisionError::WebDriver(format!("Failed to connect to {}: {}", webdriver_url, e)))?;

        Ok(Self { client })
    }
}

fn map_error(err: CmdError) -> BrowserError {
    if err.is_no_such_element() {
        return BrowserError::NoSuchElement(err.to_string());
    }
    let kind: fn(String) -> BrowserError = match &err {
        CmdError::Standard(wd) => match wd.error {
            ErrorStatus::StaleElementReference => BrowserError::StaleElement,
            ErrorStatus::ElementClickIntercepted => BrowserError::ClickIntercepted,
            ErrorStatus::NoSuchWindow => BrowserError::NoSuchWindow,
            ErrorStatus::NoSuchElement => BrowserError::NoSuchElement,
            _ => BrowserError::Session,
        },
        _ => BrowserError::Session,
    };
    kind(err.to_string())
}

/// fantoccini has no partial link text locator
fn partial_link_xpath(text: &str) -> String {
    format!("//a[contains(normalize-space(.), {})]", xpath_literal(text))
}

/// Run `$body` with `$locator` bound to the fantoccini locator for `$selector`
macro_rules! with_locator {
    ($selector:expr, |$locator:ident| $body:expr) => {{
        let partial;
        let $locator = match $selector {
            Selector::LinkText(s) => Locator::LinkText(s),
            Selector::XPath(s) => Locator::XPath(s),
            Selector::Css(s) => Locator::Css(s),
            Selector::PartialLinkText(s) => {
                partial = partial_link_xpath(s);
                Locator::XPath(&partial)
            }
        };
        $body
    }};
}

#[async_trait]
impl Browser for FirefoxBrowser {
    type Element = Element;

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        self.client.goto(url).await.map_err(map_error)
    }

    async fn find_all(&self, selector: &Selector) -> BrowserResult<Vec<Element>> {
        with_locator!(selector, |locator| self.client.find_all(locator).await.map_err(map_error))
    }

    async fn find_all_within(&self, parent: &Element, selector: &Selector) -> BrowserResult<Vec<Element>> {
        with_locator!(selector, |locator| parent.find_all(locator).await.map_err(map_error))
    }

    async fn click(&self, element: &Element) -> BrowserResult<()> {
        element.click().await.map_err(map_error)
    }

    async fn text(&self, element: &Element) -> BrowserResult<String> {
        element.text().await.map_err(map_error)
    }

    async fn attr(&self, element: &Element, name: &str) -> BrowserResult<Option<String>> {
        element.attr(name).await.map_err(map_error)
    }

    async fn is_displayed(&self, element: &Element) -> BrowserResult<bool> {
        element.is_displayed().await.map_err(map_error)
    }

    async fn title(&self) -> BrowserResult<String> {
        self.client.title().await.map_err(map_error)
    }

    async fn window_handles(&self) -> BrowserResult<Vec<WindowHandle>> {
        let handles = self.client.windows().await.map_err(map_error)?;
        Ok(handles
            .into_iter()
            .map(|h| WindowHandle::new(String::from(h)))
            .collect())
    }

    async fn current_window(&self) -> BrowserResult<WindowHandle> {
        let handle = self.client.window().await.map_err(map_error)?;
        Ok(WindowHandle::new(String::from(handle)))
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> BrowserResult<()> {
        let handle = fantoccini::wd::WindowHandle::try_from(handle.as_str().to_string())
            .map_err(|e| BrowserError::NoSuchWindow(e.to_string()))?;
        self.client.switch_to_window(handle).await.map_err(map_error)
    }

    async fn cookies(&self) -> BrowserResult<Vec<Cookie>> {
        let cookies = self.client.get_all_cookies().await.map_err(map_error)?;
        Ok(cookies
            .iter()
            .map(|c| Cookie::new(c.name(), c.value()))
            .collect())
    }

    async fn user_agent(&self) -> BrowserResult<String> {
        let value = self
            .client
            .execute("return navigator.userAgent;", vec![])
            .await
            .map_err(map_error)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BrowserError::Session(format!("Unexpected user agent value: {}", value)))
    }

    async fn close(self) -> BrowserResult<()> {
        self.client
            .close()
            .await
            .map_err(|e| BrowserError::Session(format!("Failed to close session: {}", e)))
    }
}

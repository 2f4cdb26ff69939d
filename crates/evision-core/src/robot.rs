//! Run context and main loop

use crate::browser::Browser;
use crate::config::EvisionConfig;
use crate::error::Result;
use crate::events::{DownloadCompletions, DownloadPool, Event, EventBus};
use crate::screens::Screen;
use crate::ui::Ui;
use evision_types::WindowHandle;
use std::future::Future;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Completed,
    Crashed,
    Interrupted,
}

impl ExitStatus {
    /// Process exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Completed => 0,
            Self::Crashed => 1,
            Self::Interrupted => 2,
        }
    }
}

/// Everything the screens share while driving the browser
pub struct Robot<B: Browser> {
    browser: B,
    config: EvisionConfig,
    user_agent: String,
    application_window: Option<WindowHandle>,
    bus: EventBus,
    downloads: DownloadPool,
    completions: DownloadCompletions,
}

impl<B: Browser> Robot<B> {
    /// Set up a run; asks the browser for its user agent once.
    ///
    /// `None` when `interrupt` completes first. The browser is closed
    /// whenever no robot comes out of this.
    pub async fn start(
        browser: B,
        config: EvisionConfig,
        bus: EventBus,
        downloads: DownloadPool,
        completions: DownloadCompletions,
        interrupt: impl Future<Output = ()>,
    ) -> Result<Option<Self>> {
        let user_agent = tokio::select! {
            biased;
            _ = interrupt => None,
            user_agent = browser.user_agent() => Some(user_agent),
        };

        let user_agent = match user_agent {
            Some(Ok(user_agent)) => user_agent,
            Some(Err(e)) => {
                close_quietly(browser).await;
                return Err(e.into());
            }
            None => {
                log::error!("Interrupted while starting");
                close_quietly(browser).await;
                return Ok(None);
            }
        };
        log::debug!("Browser user agent: {}", user_agent);

        Ok(Some(Self {
            browser,
            config,
            user_agent,
            application_window: None,
            bus,
            downloads,
            completions,
        }))
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn config(&self) -> &EvisionConfig {
        &self.config
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn ui(&self) -> Ui<'_, B> {
        Ui::new(&self.browser, &self.config, self.application_window.as_ref())
    }

    pub fn application_window(&self) -> Option<&WindowHandle> {
        self.application_window.as_ref()
    }

    pub fn set_application_window(&mut self, handle: WindowHandle) {
        self.application_window = Some(handle);
    }

    pub fn post(&mut self, event: Event) {
        self.bus.post(event);
    }

    /// Post the completions of downloads that have finished so far
    pub fn pump(&mut self) {
        while let Some(event) = self.completions.try_next() {
            self.bus.post(event);
        }
    }

    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Run from `initial` until done or until `interrupt` completes
    pub async fn run_until(&mut self, initial: Screen, interrupt: impl Future<Output = ()>) -> ExitStatus {
        let result = tokio::select! {
            result = self.drive(initial) => Some(result),
            _ = interrupt => None,
        };

        let (status, error) = match result {
            Some(Ok(())) => {
                self.downloads.drain().await;
                (ExitStatus::Completed, None)
            }
            Some(Err(e)) => {
                log::error!("Crashed with uncaught error: {}", error_chain(&e));
                self.downloads.drain().await;
                (ExitStatus::Crashed, Some(e.to_string()))
            }
            None => {
                log::error!("Interrupted");
                self.downloads.abort();
                (ExitStatus::Interrupted, None)
            }
        };

        self.pump();
        self.post(Event::RunFinishing { error });
        status
    }

    async fn drive(&mut self, initial: Screen) -> Result<()> {
        let mut screen = Some(initial);
        while let Some(current) = screen {
            log::debug!("Entering {} screen", current.name());
            screen = current.process(self).await?;
            self.pump();
        }
        Ok(())
    }
}

/// Completes on Ctrl-C. Never completes if the signal can't be watched.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Close `browser`, logging instead of failing
pub async fn close_quietly<B: Browser>(browser: B) {
    if let Err(e) = browser.close().await {
        log::warn!("{}", e);
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

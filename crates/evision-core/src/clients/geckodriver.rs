//! Local geckodriver process

use crate::error::{EvisionError, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

const READY_ATTEMPTS: u32 = 100;
const READY_INTERVAL: Duration = Duration::from_millis(100);

/// A geckodriver child process, killed when dropped
pub struct Geckodriver {
    child: Child,
    url: String,
}

impl Geckodriver {
    /// Start geckodriver on `port` and wait until it accepts sessions.
    /// Its output goes to `log_path`, or nowhere.
    pub async fn spawn(binary: &Path, port: u16, log_path: Option<&Path>) -> Result<Self> {
        let (stdout, stderr) = match log_path {
            Some(path) => {
                let file = std::fs::File::create(path)?;
                (Stdio::from(file.try_clone()?), Stdio::from(file))
            }
            None => (Stdio::null(), Stdio::null()),
        };

        log::debug!("Starting {} on port {}", binary.display(), port);
        let child = Command::new(binary)
            .arg("--port")
            .arg(port.to_string())
            .stdout(stdout)
            .stderr(stderr)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EvisionError::WebDriver(format!("Failed to start {}: {}", binary.display(), e)))?;

        let url = format!("http://localhost:{}", port);
        wait_until_ready(&url).await?;
        log::debug!("geckodriver ready at {}", url);

        Ok(Self { child, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.kill().await {
            log::warn!("Failed to stop geckodriver: {}", e);
        }
    }
}

/// Poll the WebDriver status endpoint until the server answers
pub async fn wait_until_ready(url: &str) -> Result<()> {
    let http_client = reqwest::Client::new();
    let status_url = format!("{}/status", url);

    for _ in 0..READY_ATTEMPTS {
        match http_client.get(&status_url).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => log::trace!("{} answered {}", status_url, response.status()),
            Err(e) => log::trace!("{} not reachable yet: {}", status_url, e),
        }
        tokio::time::sleep(READY_INTERVAL).await;
    }

    Err(EvisionError::WebDriver(format!(
        "WebDriver at {} did not become ready",
        url
    )))
}

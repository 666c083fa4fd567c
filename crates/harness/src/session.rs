//! Browser session provisioning and teardown
//!
//! One session per scenario, owned exclusively from provisioning to
//! teardown. Teardown is tolerant by construction: it first dismisses any
//! stray native dialog (an open dialog blocks the WebDriver close call),
//! then closes the session, logging rather than raising on every failure.

use std::time::{Duration, Instant};

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{BrowserSettings, EnvironmentSettings, TestSettings};
use crate::error::{HarnessError, HarnessResult};

/// Poll cadence for every bounded wait.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Cloneable handle pages use to reach the browser.
///
/// Cloning shares the underlying WebDriver session; the deadline is the
/// implicit bound applied to all element and toast waits.
#[derive(Clone)]
pub struct Driver {
    client: Client,
    deadline: Duration,
    env: EnvironmentSettings,
}

impl Driver {
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Go to a path relative to the configured base URL.
    pub async fn navigate(&self, path: &str) -> HarnessResult<()> {
        let url = self.env.url(path);
        debug!("Navigating to {}", url);
        Ok(self.client.goto(&url).await?)
    }

    /// Poll for an element until the implicit deadline; absence is an
    /// `ActionTimeout` naming what was being waited for.
    pub async fn wait_for(&self, locator: Locator<'_>, what: &str) -> HarnessResult<Element> {
        self.wait_for_within(locator, self.deadline)
            .await
            .ok_or_else(|| HarnessError::ActionTimeout(what.to_string()))
    }

    /// Poll for an element, `None` when the deadline elapses.
    pub async fn try_wait_for(&self, locator: Locator<'_>) -> Option<Element> {
        self.wait_for_within(locator, self.deadline).await
    }

    async fn wait_for_within(&self, locator: Locator<'_>, deadline: Duration) -> Option<Element> {
        let start = Instant::now();
        loop {
            if let Ok(element) = self.client.find(locator).await {
                return Some(element);
            }
            if start.elapsed() >= deadline {
                return None;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Read the text of the first match right now; empty when absent.
    pub async fn first_text(&self, locator: Locator<'_>) -> String {
        match self.client.find_all(locator).await {
            Ok(elements) => match elements.into_iter().next() {
                Some(element) => element.text().await.unwrap_or_default(),
                None => String::new(),
            },
            Err(_) => String::new(),
        }
    }

    /// Bounded wait for a toast-like element, returning its text or empty.
    pub async fn try_wait_text(&self, locator: Locator<'_>) -> String {
        match self.try_wait_for(locator).await {
            Some(element) => element.text().await.unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Single unpolled presence check.
    pub async fn exists_now(&self, locator: Locator<'_>) -> bool {
        matches!(self.client.find_all(locator).await, Ok(found) if !found.is_empty())
    }

    pub async fn all(&self, locator: Locator<'_>) -> HarnessResult<Vec<Element>> {
        Ok(self.client.find_all(locator).await?)
    }

    /// Poll for a native dialog, returning its text when one appears
    /// within the wait. At least one attempt is always made.
    pub async fn try_alert_text(&self, wait: Duration) -> Option<String> {
        let start = Instant::now();
        loop {
            if let Ok(text) = self.client.get_alert_text().await {
                return Some(text);
            }
            if start.elapsed() >= wait {
                return None;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Accept any open dialog so it cannot block later commands.
    /// Returns whether a dialog was present.
    pub async fn try_dismiss_alert(&self) -> bool {
        match self.try_alert_text(Duration::ZERO).await {
            Some(text) => {
                info!("Dismissing stray dialog: {}", text);
                if let Err(e) = self.client.accept_alert().await {
                    warn!("Dialog dismissal failed: {}", e);
                }
                true
            }
            None => false,
        }
    }
}

/// One exclusive browser session.
pub struct Session {
    driver: Driver,
}

impl Session {
    /// Connect to the WebDriver endpoint and configure the browser.
    ///
    /// Any connect failure is fatal for the scenario; there is no retry.
    pub async fn start(settings: &TestSettings) -> HarnessResult<Session> {
        let browser = &settings.browser;
        info!(
            "Provisioning {} session via {}{}",
            browser.kind,
            browser.webdriver_url,
            if browser.headless { " (headless)" } else { "" }
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities(browser))
            .connect(&browser.webdriver_url)
            .await
            .map_err(|e| {
                HarnessError::Provisioning(format!(
                    "cannot create a session at {}: {}",
                    browser.webdriver_url, e
                ))
            })?;

        let window = browser.window;
        if let Err(e) = client.set_window_size(window.width, window.height).await {
            warn!(
                "Window resize to {}x{} failed: {}",
                window.width, window.height, e
            );
        }

        Ok(Session {
            driver: Driver {
                client,
                deadline: settings.wait_deadline(),
                env: settings.environment.clone(),
            },
        })
    }

    /// Handle for page objects. Clones share this session.
    pub fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Navigate to a path relative to the configured base URL.
    pub async fn navigate(&self, path: &str) -> HarnessResult<()> {
        self.driver.navigate(path).await
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        Ok(self.driver.client.current_url().await?.to_string())
    }

    /// PNG bytes of the current viewport.
    pub async fn screenshot(&self) -> HarnessResult<Vec<u8>> {
        Ok(self.driver.client.screenshot().await?)
    }

    /// Close the session. Safe to call when the session is already
    /// unusable; every failure is logged and swallowed. A blocking
    /// dialog is dismissed first, since an open dialog fails the close
    /// command on most drivers.
    pub async fn end(self) {
        self.driver.try_dismiss_alert().await;
        let Session { driver, .. } = self;
        match driver.client.close().await {
            Ok(()) => debug!("Session closed"),
            Err(e) => warn!("[TEARDOWN] Session close failed: {}", e),
        }
    }
}

/// W3C capabilities for the configured browser.
///
/// Prompts are left unhandled ("ignore") so a stray dialog stays visible
/// to the dialog checks instead of being silently swallowed by the driver.
fn capabilities(browser: &BrowserSettings) -> serde_json::Map<String, serde_json::Value> {
    let mut caps = serde_json::Map::new();
    caps.insert("browserName".to_string(), json!(browser.kind));
    caps.insert("unhandledPromptBehavior".to_string(), json!("ignore"));

    if browser.headless {
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless", "--disable-gpu", "--no-sandbox"] }),
        );
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": ["-headless"] }),
        );
    }

    caps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowSize;

    fn browser(headless: bool) -> BrowserSettings {
        BrowserSettings {
            kind: "chrome".to_string(),
            headless,
            timeout_seconds: 5,
            webdriver_url: "http://localhost:9515".to_string(),
            window: WindowSize::default(),
        }
    }

    #[test]
    fn headless_capabilities_cover_both_browsers() {
        let caps = capabilities(&browser(true));
        assert_eq!(caps["browserName"], json!("chrome"));
        assert_eq!(caps["unhandledPromptBehavior"], json!("ignore"));
        let chrome_args = caps["goog:chromeOptions"]["args"].to_string();
        assert!(chrome_args.contains("--headless"));
        assert!(caps["moz:firefoxOptions"]["args"]
            .to_string()
            .contains("-headless"));
    }

    #[test]
    fn headed_capabilities_omit_headless_args() {
        let caps = capabilities(&browser(false));
        assert!(!caps.contains_key("goog:chromeOptions"));
        assert!(!caps.contains_key("moz:firefoxOptions"));
    }

    #[tokio::test]
    async fn provisioning_failure_is_fatal_and_typed() {
        let mut settings = TestSettings::default();
        settings.browser.webdriver_url = "http://127.0.0.1:9".to_string();
        match Session::start(&settings).await {
            Err(HarnessError::Provisioning(msg)) => {
                assert!(msg.contains("127.0.0.1:9"));
            }
            Ok(_) => panic!("no WebDriver should be listening on port 9"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}

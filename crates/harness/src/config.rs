//! Suite configuration
//!
//! Settings are read once from `settings.json` before any scenario runs and
//! shared immutably (`Arc<TestSettings>`) from then on. Every field has a
//! default so a partial file, or no file at all, still yields a usable
//! configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestSettings {
    pub browser: BrowserSettings,
    pub environment: EnvironmentSettings,
    pub report: ReportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserSettings {
    /// Browser to request from the WebDriver endpoint ("chrome" or "firefox").
    pub kind: String,
    pub headless: bool,
    /// Implicit deadline, in seconds, for every bounded element/toast wait.
    pub timeout_seconds: u64,
    pub webdriver_url: String,
    pub window: WindowSize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnvironmentSettings {
    /// Absolute navigation URLs are built from this plus a relative path.
    pub base_url: String,
    /// Default account used by sign-in steps and pre-clean.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportSettings {
    /// Output location of the HTML report. Screenshots land in a
    /// `screenshots/` directory beside it.
    pub path: PathBuf,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        BrowserSettings {
            kind: "chrome".to_string(),
            headless: true,
            timeout_seconds: 5,
            webdriver_url: "http://localhost:9515".to_string(),
            window: WindowSize::default(),
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize {
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        EnvironmentSettings {
            base_url: "http://localhost:3000".to_string(),
            username: "annie.jose@example.com".to_string(),
            password: "123456".to_string(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            path: PathBuf::from("reports/TestReport.html"),
        }
    }
}

impl TestSettings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            HarnessError::Settings(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    /// Bounded-wait deadline applied to element and toast polling.
    pub fn wait_deadline(&self) -> Duration {
        Duration::from_secs(self.browser.timeout_seconds)
    }
}

impl EnvironmentSettings {
    /// Join the base URL with a relative path.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

impl ReportSettings {
    /// Directory the report file lives in; attachments resolve against it.
    pub fn report_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if p.as_os_str().is_empty() => PathBuf::from("."),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from("."),
        }
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.report_dir().join("screenshots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_settings_parse() {
        let json = r#"{
            "browser": {
                "kind": "firefox",
                "headless": false,
                "timeoutSeconds": 12,
                "webdriverUrl": "http://localhost:4444",
                "window": { "width": 1280, "height": 720 }
            },
            "environment": {
                "baseUrl": "https://staging.skillfolio.dev/",
                "username": "qa@skillfolio.dev",
                "password": "secret"
            },
            "report": { "path": "out/Suite.html" }
        }"#;
        let settings: TestSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.browser.kind, "firefox");
        assert!(!settings.browser.headless);
        assert_eq!(settings.wait_deadline(), Duration::from_secs(12));
        assert_eq!(settings.browser.window.width, 1280);
        assert_eq!(settings.environment.username, "qa@skillfolio.dev");
        assert_eq!(settings.report.path, PathBuf::from("out/Suite.html"));
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: TestSettings =
            serde_json::from_str(r#"{ "environment": { "baseUrl": "http://127.0.0.1:8080" } }"#)
                .unwrap();
        assert_eq!(settings.browser.kind, "chrome");
        assert!(settings.browser.headless);
        assert_eq!(settings.browser.timeout_seconds, 5);
        assert_eq!(settings.environment.base_url, "http://127.0.0.1:8080");
        assert_eq!(settings.report.path, PathBuf::from("reports/TestReport.html"));
    }

    #[test]
    fn url_join_handles_slashes() {
        let env = EnvironmentSettings {
            base_url: "http://localhost:3000/".to_string(),
            ..Default::default()
        };
        assert_eq!(env.url("/profile"), "http://localhost:3000/profile");
        assert_eq!(env.url("profile"), "http://localhost:3000/profile");
        assert_eq!(env.url(""), "http://localhost:3000");
    }

    #[test]
    fn report_dirs_derive_from_path() {
        let report = ReportSettings {
            path: PathBuf::from("reports/TestReport.html"),
        };
        assert_eq!(report.report_dir(), PathBuf::from("reports"));
        assert_eq!(report.screenshot_dir(), PathBuf::from("reports/screenshots"));

        let bare = ReportSettings {
            path: PathBuf::from("TestReport.html"),
        };
        assert_eq!(bare.report_dir(), PathBuf::from("."));
    }

    #[test]
    fn load_missing_file_is_a_settings_error() {
        let err = TestSettings::load(Path::new("/no/such/settings.json")).unwrap_err();
        assert!(matches!(err, crate::error::HarnessError::Settings(_)));
    }
}

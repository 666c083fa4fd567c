//! Sign-in step bindings
//!
//! Rejected-login assertions match message text by pattern rather than
//! exact string: the application words its prompts inconsistently across
//! releases, and the assertion cares about the reason class, not the
//! phrasing.

use std::time::Duration;

use regex::RegexBuilder;

use skillfolio_harness::config::EnvironmentSettings;
use skillfolio_harness::error::{HarnessError, HarnessResult};
use skillfolio_harness::pages::LoginPage;

use crate::steps::{LogBuffer, LogSource};

const EMAIL_PROMPT_PATTERN: &str = "valid|email|required";
const PASSWORD_PROMPT_PATTERN: &str = "at least 6|required|password";
const REJECTION_PATTERN: &str = "invalid|incorrect|unauthor|confirm|verification|failed|required";

fn matches_any(text: &str, pattern: &str) -> bool {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

pub struct AuthSteps {
    login: LoginPage,
    env: EnvironmentSettings,
    deadline: Duration,
    logs: LogBuffer,
}

impl AuthSteps {
    pub fn new(login: LoginPage, env: EnvironmentSettings, deadline: Duration) -> Self {
        AuthSteps {
            login,
            env,
            deadline,
            logs: LogBuffer::default(),
        }
    }

    /// Navigate home and open the Sign In form.
    pub async fn open_login_page(&self) -> HarnessResult<()> {
        self.login.open_sign_in().await?;
        if !self.login.is_at_sign_in().await {
            return Err(HarnessError::assertion(
                "the sign-in form did not appear",
                self.page_signals().await,
            ));
        }
        Ok(())
    }

    /// Fill the credentials and submit, with no outcome expectation.
    pub async fn login_with(&self, email: &str, password: &str) -> HarnessResult<()> {
        self.login.login(email, password).await
    }

    /// The configured account with a password that cannot match.
    pub async fn login_with_wrong_password(&self) -> HarnessResult<()> {
        self.login_with(&self.env.username, "definitely-not-it").await
    }

    /// Submit the form with both fields left blank.
    pub async fn login_with_empty_credentials(&self) -> HarnessResult<()> {
        self.login_with("", "").await
    }

    /// Sign in with the configured account unless a session is already
    /// active. Pre-clean relies on this being idempotent.
    pub async fn login_as_default_user(&self) -> HarnessResult<()> {
        if self.login.is_logged_in().await {
            return Ok(());
        }
        self.login.open_sign_in().await?;
        self.login.login(&self.env.username, &self.env.password).await?;
        if !self.login.wait_until_logged_in(self.deadline).await {
            return Err(HarnessError::assertion(
                format!("login failed for the default user {}", self.env.username),
                self.page_signals().await,
            ));
        }
        self.logs.info(format!("Signed in as {}", self.env.username));
        Ok(())
    }

    /// The signed-in indicator is visible.
    pub async fn expect_signed_in(&self) -> HarnessResult<()> {
        let indicator = self.login.success_text().await;
        if !indicator.contains("Sign Out") {
            return Err(HarnessError::assertion(
                "expected Sign Out to be visible after login",
                self.page_signals().await,
            ));
        }
        self.logs.info("Sign Out is visible");
        Ok(())
    }

    /// The attempted sign-in was rejected, either by inline validation
    /// prompts or by an error toast with a plausible reason.
    pub async fn expect_sign_in_rejected(&self) -> HarnessResult<()> {
        let email_error = self.login.email_error().await;
        let password_error = self.login.password_error().await;

        if !email_error.is_empty() || !password_error.is_empty() {
            if !email_error.is_empty() && !matches_any(&email_error, EMAIL_PROMPT_PATTERN) {
                return Err(HarnessError::assertion(
                    format!("unexpected email validation message: '{email_error}'"),
                    self.page_signals().await,
                ));
            }
            if !password_error.is_empty() && !matches_any(&password_error, PASSWORD_PROMPT_PATTERN) {
                return Err(HarnessError::assertion(
                    format!("unexpected password validation message: '{password_error}'"),
                    self.page_signals().await,
                ));
            }
            self.logs.info(format!(
                "Validation prompts: email='{email_error}' password='{password_error}'"
            ));
            return Ok(());
        }

        if self.login.lockout_visible().await {
            self.logs.info("Account lockout notice is visible");
            return Ok(());
        }

        let toast = self.login.popup_error().await;
        if toast.is_empty() {
            return Err(HarnessError::assertion(
                "expected an error prompt or toast after a rejected sign-in",
                self.page_signals().await,
            ));
        }
        if !matches_any(&toast, REJECTION_PATTERN) {
            return Err(HarnessError::assertion(
                format!("unexpected rejection text: '{toast}'"),
                self.page_signals().await,
            ));
        }
        self.logs.info(format!("Rejection toast: {toast}"));
        Ok(())
    }

    /// Current sign-in signals for assertion diagnostics.
    async fn page_signals(&self) -> String {
        format!(
            "logged_in={}, at_sign_in={}, email_prompt='{}', password_prompt='{}'",
            self.login.is_logged_in().await,
            self.login.is_at_sign_in().await,
            self.login.email_error().await,
            self.login.password_error().await,
        )
    }
}

impl LogSource for AuthSteps {
    fn take_logs(&self) -> Vec<String> {
        self.logs.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_patterns_cover_the_application_wordings() {
        assert!(matches_any("Please enter a valid email address", EMAIL_PROMPT_PATTERN));
        assert!(matches_any("Email is required", EMAIL_PROMPT_PATTERN));
        assert!(matches_any(
            "Password must be at least 6 characters",
            PASSWORD_PROMPT_PATTERN
        ));
        assert!(matches_any("Invalid username or password", REJECTION_PATTERN));
        assert!(matches_any("UNAUTHORIZED", REJECTION_PATTERN));
        assert!(matches_any("Login failed", REJECTION_PATTERN));
        assert!(!matches_any("Welcome back!", REJECTION_PATTERN));
    }
}

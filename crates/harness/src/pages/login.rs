//! Sign-in page object
//!
//! Surfaces the authentication flow plus the validation and lockout
//! signals around it. Every getter is read-style: absent elements come
//! back as empty strings or `false`, never as errors.

use std::time::{Duration, Instant};

use fantoccini::Locator;
use tokio::time::sleep;

use crate::error::HarnessResult;
use crate::session::{Driver, POLL_INTERVAL};

const SIGN_IN_LINK: &str = "//a[@class='item' and text()='Sign In']";
const EMAIL_FIELD: &str = "input[name='email'][placeholder='Email address']";
const PASSWORD_FIELD: &str = "input[type='password']";
const LOGIN_BUTTON: &str = "//button[normalize-space()='Login']";
const SIGN_OUT: &str = "//button[normalize-space()='Sign Out'] | //a[normalize-space()='Sign Out']";
const EMAIL_ERROR: &str = "//div[text()='Please enter a valid email address']";
const PASSWORD_ERROR: &str = "//div[text()='Password must be at least 6 characters']";
const TOAST_INNER: &str = "//div[contains(@class,'ns-box-inner')]";
const LOCKOUT: &str = "//div[contains(text(),'too many attempts') or contains(text(),'locked')]";

pub struct LoginPage {
    driver: Driver,
}

impl LoginPage {
    pub fn new(driver: Driver) -> Self {
        LoginPage { driver }
    }

    /// Navigate home and open the Sign In form.
    pub async fn open_sign_in(&self) -> HarnessResult<()> {
        self.driver.navigate("/").await?;
        self.driver
            .wait_for(Locator::XPath(SIGN_IN_LINK), "Sign In link")
            .await?
            .click()
            .await?;
        Ok(())
    }

    /// Fill the credentials and submit.
    pub async fn login(&self, email: &str, password: &str) -> HarnessResult<()> {
        let email_field = self
            .driver
            .wait_for(Locator::Css(EMAIL_FIELD), "email field")
            .await?;
        email_field.clear().await?;
        email_field.send_keys(email).await?;

        let password_field = self
            .driver
            .wait_for(Locator::Css(PASSWORD_FIELD), "password field")
            .await?;
        password_field.clear().await?;
        password_field.send_keys(password).await?;

        self.driver
            .wait_for(Locator::XPath(LOGIN_BUTTON), "Login button")
            .await?
            .click()
            .await?;
        Ok(())
    }

    /// Whether the signed-in indicator (Sign Out) is present right now.
    pub async fn is_logged_in(&self) -> bool {
        self.driver.exists_now(Locator::XPath(SIGN_OUT)).await
    }

    /// Poll for the signed-in indicator.
    pub async fn wait_until_logged_in(&self, wait: Duration) -> bool {
        let start = Instant::now();
        loop {
            if self.is_logged_in().await {
                return true;
            }
            if start.elapsed() >= wait {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Whether the Sign In form itself is on screen.
    pub async fn is_at_sign_in(&self) -> bool {
        self.driver.exists_now(Locator::Css(EMAIL_FIELD)).await
    }

    /// Text of the signed-in indicator, empty when absent.
    pub async fn success_text(&self) -> String {
        self.driver
            .first_text(Locator::XPath(SIGN_OUT))
            .await
            .trim()
            .to_string()
    }

    /// Inline email validation message, empty when absent.
    pub async fn email_error(&self) -> String {
        self.driver
            .first_text(Locator::XPath(EMAIL_ERROR))
            .await
            .trim()
            .to_string()
    }

    /// Inline password validation message, empty when absent.
    pub async fn password_error(&self) -> String {
        self.driver
            .first_text(Locator::XPath(PASSWORD_ERROR))
            .await
            .trim()
            .to_string()
    }

    /// Bounded wait for a notification toast, empty when none shows.
    /// Rejected logins surface their reason here rather than inline.
    pub async fn popup_error(&self) -> String {
        self.driver
            .try_wait_text(Locator::XPath(TOAST_INNER))
            .await
            .trim()
            .to_string()
    }

    pub async fn lockout_visible(&self) -> bool {
        self.driver.exists_now(Locator::XPath(LOCKOUT)).await
    }
}

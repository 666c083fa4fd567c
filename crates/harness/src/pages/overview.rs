//! Profile overview page object

use fantoccini::Locator;
use tracing::warn;

use crate::error::HarnessResult;
use crate::pages::SUCCESS_TOAST;
use crate::session::Driver;

const NAV_PROFILE: &str = "//a[@class='item' and normalize-space()='Profile']";
const DESCRIPTION_ANCHOR: &str = "//*[normalize-space()='Description']";
const NAME_DROPDOWN_TOGGLE: &str = "div.ui.dropdown i.dropdown.icon";
const FIRST_NAME_INPUT: &str = "input[name='firstName']";
const LAST_NAME_INPUT: &str = "input[name='lastName']";
const SAVE_BUTTON: &str = "button.ui.teal.button";
const DISPLAY_NAME: &str = "div.title.active";

pub struct OverviewPage {
    driver: Driver,
}

impl OverviewPage {
    pub fn new(driver: Driver) -> Self {
        OverviewPage { driver }
    }

    /// Click the Profile header item and wait for the page body.
    pub async fn open_profile(&self) -> HarnessResult<()> {
        self.driver
            .wait_for(Locator::XPath(NAV_PROFILE), "Profile nav item")
            .await?
            .click()
            .await?;
        self.driver
            .wait_for(Locator::XPath(DESCRIPTION_ANCHOR), "profile description")
            .await?;
        Ok(())
    }

    /// Rendered display name, empty when not present yet.
    pub async fn display_name(&self) -> String {
        self.driver
            .first_text(Locator::Css(DISPLAY_NAME))
            .await
            .trim()
            .to_string()
    }

    /// Expand the basic-info editor, replace both names, and save.
    pub async fn edit_name(&self, first: &str, last: &str) -> HarnessResult<()> {
        self.driver
            .wait_for(Locator::Css(NAME_DROPDOWN_TOGGLE), "name editor toggle")
            .await?
            .click()
            .await?;

        let first_input = self
            .driver
            .wait_for(Locator::Css(FIRST_NAME_INPUT), "first name input")
            .await?;
        first_input.clear().await?;
        first_input.send_keys(first).await?;

        let last_input = self
            .driver
            .wait_for(Locator::Css(LAST_NAME_INPUT), "last name input")
            .await?;
        last_input.clear().await?;
        last_input.send_keys(last).await?;

        self.driver
            .wait_for(Locator::Css(SAVE_BUTTON), "save button")
            .await?
            .click()
            .await?;

        let toast = self.driver.try_wait_text(Locator::XPath(SUCCESS_TOAST)).await;
        if toast.trim().is_empty() {
            warn!("Name edit to {} {} not confirmed before the wait expired", first, last);
        }
        Ok(())
    }

    /// Bounded wait for the success toast; empty string when none shows.
    pub async fn success_toast(&self) -> String {
        self.driver
            .try_wait_text(Locator::XPath(SUCCESS_TOAST))
            .await
            .trim()
            .to_string()
    }
}

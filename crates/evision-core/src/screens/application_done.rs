use super::{locators, ApplicationDetailsScreen, Screen};
use crate::browser::Browser;
use crate::constants::APPLICATION_DETAILS_TAB;
use crate::error::Result;
use crate::robot::Robot;
use crate::wait::present;

/// Back in the application window with the current applicant done
#[derive(Debug, Default)]
pub struct ApplicationDoneScreen;

impl ApplicationDoneScreen {
    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Option<Screen>> {
        let ui = robot.ui();
        let browser = ui.browser();

        // The Save button only exists in the application window
        ui.wait(ui.config().timeouts.confirm())
            .require(browser, &present(locators::SAVE_BUTTON))
            .await?;

        if browser.find(&locators::NEXT_APPLICANT_BUTTON).await?.is_none() {
            log::info!("No more applicants");
            return Ok(None);
        }

        ui.click(&locators::NEXT_APPLICANT_BUTTON).await?;
        ui.activate_tab(APPLICATION_DETAILS_TAB).await?;
        Ok(Some(Screen::ApplicationDetails(ApplicationDetailsScreen)))
    }
}

use super::{ApplicationDetailsScreen, Screen};
use crate::browser::Browser;
use crate::error::Result;
use crate::robot::Robot;
use crate::wait::title_is;

/// Opens eVision and waits for the user to bring up an application
#[derive(Debug, Default)]
pub struct StartScreen;

impl StartScreen {
    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Screen> {
        let entry_url = robot.config().entry_url.clone();
        robot.browser().goto(&entry_url).await?;
        log::info!("Waiting for user to log into eVision, bring up folder, and open the application of interest");

        let expectation = title_is(robot.config().application_title.clone());
        let window = robot.ui().open_window(None, &expectation, None).await?;
        log::info!("Found application window; taking over");

        robot.set_application_window(window);
        Ok(Screen::ApplicationDetails(ApplicationDetailsScreen))
    }
}

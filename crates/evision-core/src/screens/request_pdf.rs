use super::pdf_request::PdfRequest;
use super::{ApplicationDoneScreen, Screen, TroubleshootingScreen};
use crate::browser::Browser;
use crate::constants::UNWANTED_DOCUMENTS;
use crate::error::Result;
use crate::robot::Robot;

/// The "Manage Applicant PDF" window, first attempt
#[derive(Debug, Default)]
pub struct RequestPdfScreen {
    request: PdfRequest,
}

impl RequestPdfScreen {
    pub fn new(request: PdfRequest) -> Self {
        Self { request }
    }

    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Screen> {
        let outcome = {
            let ui = robot.ui();
            self.request.wait_for_dom(&ui).await?;
            self.request.deselect_unwanted(&ui, UNWANTED_DOCUMENTS).await?;
            self.request.try_generate(&ui, robot.user_agent()).await?
        };

        match outcome.into_event() {
            Some(event) => {
                robot.post(event);
                self.request.close_result_window(&robot.ui()).await?;
                Ok(Screen::ApplicationDone(ApplicationDoneScreen))
            }
            None => {
                log::info!("eVision produced a defective PDF; looking for the documents responsible");
                let ui = robot.ui();
                self.request.close_result_window(&ui).await?;
                self.request.open_manager(&ui).await?;
                Ok(Screen::RequestPdfTroubleshooting(TroubleshootingScreen::new(self.request)))
            }
        }
    }
}


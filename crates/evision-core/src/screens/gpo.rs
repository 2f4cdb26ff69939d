use super::pdf_request::PdfRequest;
use super::{RequestPdfScreen, Screen};
use crate::browser::Browser;
use crate::constants::APPLICATION_UTILITIES_TAB;
use crate::error::Result;
use crate::robot::Robot;

/// The GPO tab, from which the PDF manager is opened
#[derive(Debug, Default)]
pub struct GpoScreen;

impl GpoScreen {
    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Screen> {
        let ui = robot.ui();
        ui.activate_tab(APPLICATION_UTILITIES_TAB).await?;

        let request = PdfRequest;
        request.open_manager(&ui).await?;
        Ok(Screen::RequestPdf(RequestPdfScreen::new(request)))
    }
}

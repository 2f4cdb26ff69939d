//! The eVision screens the robot moves through
//!
//! Each screen drives the browser while it is in front and names the screen
//! that comes next. Processing ends when a screen returns `None`.

pub mod application_details;
pub mod application_done;
pub mod gpo;
pub mod locators;
pub mod pdf_request;
pub mod request_pdf;
pub mod start;
pub mod troubleshooting;

pub use application_details::ApplicationDetailsScreen;
pub use application_done::ApplicationDoneScreen;
pub use gpo::GpoScreen;
pub use pdf_request::{classify, Classification, GenerationOutcome, PdfRequest, ResultPage};
pub use request_pdf::RequestPdfScreen;
pub use start::StartScreen;
pub use troubleshooting::TroubleshootingScreen;

use crate::browser::Browser;
use crate::error::Result;
use crate::robot::Robot;

#[derive(Debug)]
pub enum Screen {
    Start(StartScreen),
    ApplicationDetails(ApplicationDetailsScreen),
    Gpo(GpoScreen),
    RequestPdf(RequestPdfScreen),
    RequestPdfTroubleshooting(TroubleshootingScreen),
    ApplicationDone(ApplicationDoneScreen),
}

impl Screen {
    /// Where every run begins
    pub fn initial() -> Self {
        Self::Start(StartScreen)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "Start",
            Self::ApplicationDetails(_) => "Application Details",
            Self::Gpo(_) => "GPO",
            Self::RequestPdf(_) => "Request PDF",
            Self::RequestPdfTroubleshooting(_) => "Request PDF (troubleshooting)",
            Self::ApplicationDone(_) => "Application Done",
        }
    }

    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Option<Screen>> {
        match self {
            Self::Start(screen) => screen.process(robot).await.map(Some),
            Self::ApplicationDetails(screen) => screen.process(robot).await.map(Some),
            Self::Gpo(screen) => screen.process(robot).await.map(Some),
            Self::RequestPdf(screen) => screen.process(robot).await.map(Some),
            Self::RequestPdfTroubleshooting(screen) => screen.process(robot).await.map(Some),
            Self::ApplicationDone(screen) => screen.process(robot).await,
        }
    }
}

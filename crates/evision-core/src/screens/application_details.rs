//! Who the current applicant is

use super::{locators, GpoScreen, Screen};
use crate::browser::Browser;
use crate::constants::{
    APPLICATION_DETAILS_TAB, GIVEN_NAME_LABEL, GPO_TAB, PERSONAL_DETAILS_TAB, PREFERRED_NAME_LABEL,
    SURNAME_LABEL,
};
use crate::error::{EvisionError, Result};
use crate::events::Event;
use crate::robot::Robot;
use crate::ui::Ui;
use evision_types::{Applicant, StudentNumber};
use once_cell::sync::Lazy;
use regex::Regex;

static STUDENT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Student No: (\d{8})").expect("valid regex"));

/// Reads of a page that is being redrawn are retried this many times
const STALE_RETRIES: u32 = 5;

/// The "Application Details" tab of the application window
#[derive(Debug, Default)]
pub struct ApplicationDetailsScreen;

impl ApplicationDetailsScreen {
    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Screen> {
        let applicant = identify(&robot.ui()).await?;
        robot.post(Event::ApplicantChanged(Some(applicant)));

        robot.ui().activate_tab(GPO_TAB).await?;
        Ok(Screen::Gpo(GpoScreen))
    }
}

/// Read the applicant's identity from the "Personal Details" tab.
///
/// eVision sometimes shows a details page that never finishes loading. Going
/// to the previous applicant and back fixes it.
async fn identify<B: Browser>(ui: &Ui<'_, B>) -> Result<Applicant> {
    let mut resyncs = 0;
    loop {
        let attempt = async {
            ui.activate_tab(PERSONAL_DETAILS_TAB).await?;
            extract_applicant(ui).await
        };
        match attempt.await {
            Err(e) if e.is_timeout() && resyncs < ui.config().resync_attempts => {
                resyncs += 1;
                log::warn!(
                    "Details page did not behave as expected ({}); clicking \"Previous Applicant\", then \"Next Applicant\" to try again",
                    e
                );
                ui.click(&locators::PREVIOUS_APPLICANT_BUTTON).await?;
                ui.click(&locators::NEXT_APPLICANT_BUTTON).await?;
                ui.activate_tab(APPLICATION_DETAILS_TAB).await?;
            }
            other => return other,
        }
    }
}

/// Read the applicant shown on the "Personal Details" tab, retrying while
/// the page is being redrawn
pub async fn extract_applicant<B: Browser>(ui: &Ui<'_, B>) -> Result<Applicant> {
    let mut retries = 0;
    loop {
        match read_applicant(ui).await {
            Err(e) if e.is_stale() && retries < STALE_RETRIES => {
                retries += 1;
                log::debug!("Details page changed while reading it; retrying");
            }
            other => return other,
        }
    }
}

async fn read_applicant<B: Browser>(ui: &Ui<'_, B>) -> Result<Applicant> {
    let short = ui.config().timeouts.short();

    let heading = ui.text_of(&locators::HEADING, short).await?;
    let student_number = parse_student_number(&heading)
        .ok_or_else(|| EvisionError::Extraction(format!("student number from {:?}", heading)))?;

    let surname = labelled_value(ui, SURNAME_LABEL).await?;
    let mut preferred_name = labelled_value(ui, PREFERRED_NAME_LABEL).await?;
    if preferred_name.is_empty() {
        preferred_name = labelled_value(ui, GIVEN_NAME_LABEL).await?;
    }

    Ok(Applicant::new(student_number, surname, preferred_name))
}

async fn labelled_value<B: Browser>(ui: &Ui<'_, B>, label: &str) -> Result<String> {
    let cell = ui
        .text_of(&locators::labelled_cell(label), ui.config().timeouts.short())
        .await?;
    Ok(strip_label(&cell, label))
}

pub fn parse_student_number(heading: &str) -> Option<StudentNumber> {
    STUDENT_NUMBER
        .captures(heading)
        .and_then(|c| StudentNumber::parse(&c[1]).ok())
}

/// Cell text minus its leading label, trimmed
pub fn strip_label(cell_text: &str, label: &str) -> String {
    cell_text.replacen(label, "", 1).trim().to_string()
}

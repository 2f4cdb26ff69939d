//! Requesting a merged applicant PDF from the "Manage Applicant PDF" window
//!
//! The window lists the applicant's documents as checkboxes. CONTINUE leads
//! to an ordering page, and a second CONTINUE starts the merge. The merge
//! ends on a result page that holds a download link, an error, or (when a
//! document broke the merge) a message with no link at all.

use super::locators;
use crate::browser::{cookie_header, Browser};
use crate::constants::{DEFECTIVE_MERGE_TEXT, ERROR_DETAILS_TEXT, MANAGE_PDF_TITLE};
use crate::error::Result;
use crate::events::{Event, PdfSource};
use crate::ui::Ui;
use crate::wait::{all_of, any_of, invisible, none_of, present, text_present, title_is, visible};
use evision_types::{Document, DocumentId, DocumentSet, WindowHandle};

/// What became of one generation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Succeeded(PdfSource),
    Failed(String),
    /// eVision claims success but offers nothing to download
    Defective,
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Event announcing a definitive outcome
    pub fn into_event(self) -> Option<Event> {
        match self {
            Self::Succeeded(source) => Some(Event::PdfGenerated(source)),
            Self::Failed(message) => Some(Event::PdfGenerationFailed { message }),
            Self::Defective => None,
        }
    }
}

/// The parts of the result page that decide the outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    /// Text of the red-font error block, if any
    pub error_text: String,
    pub download_url: Option<String>,
    /// Text of the page's result message, if it has one
    pub result_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Failed(String),
    Download(String),
    Defective,
    /// No recognizable outcome; the page body explains what went wrong
    Unrecognized,
}

/// Decide what a result page means. eVision's wording changes from time to
/// time, so this is the single place that interprets it.
pub fn classify(page: &ResultPage) -> Classification {
    let error_text = page.error_text.trim();
    if !error_text.is_empty() {
        Classification::Failed(error_text.to_string())
    } else if let Some(url) = &page.download_url {
        Classification::Download(url.clone())
    } else if page
        .result_message
        .as_deref()
        .is_some_and(|message| message.contains(DEFECTIVE_MERGE_TEXT))
    {
        Classification::Defective
    } else {
        Classification::Unrecognized
    }
}

/// Steps shared by the plain and the troubleshooting PDF requests
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRequest;

impl PdfRequest {
    /// Click "Manage Applicant PDF" and switch to the window it opens
    pub async fn open_manager<B: Browser>(&self, ui: &Ui<'_, B>) -> Result<WindowHandle> {
        let expectation = title_is(MANAGE_PDF_TITLE);
        ui.open_window(
            Some(&locators::MANAGE_PDF_BUTTON),
            &expectation,
            Some(ui.config().timeouts.medium()),
        )
        .await
    }

    /// Wait for the page script to replace the select list with checkboxes
    pub async fn wait_for_dom<B: Browser>(&self, ui: &Ui<'_, B>) -> Result<()> {
        let rewritten = all_of(vec![
            present(locators::CONTINUE_BUTTON),
            none_of(vec![visible(locators::DOCUMENT_SELECT_LIST)]),
            present(locators::DOCUMENT_LABELS),
        ]);
        ui.wait(ui.config().timeouts.medium())
            .require(ui.browser(), &rewritten)
            .await
    }

    /// The documents on offer, in page order
    pub async fn parse_documents<B: Browser>(&self, ui: &Ui<'_, B>) -> Result<DocumentSet> {
        let browser = ui.browser();
        let mut documents = Vec::new();

        for label in browser.find_all(&locators::DOCUMENT_LABELS).await? {
            let description = browser.text(&label).await?.trim().to_string();
            let Some(checkbox) = browser
                .find_all_within(&label, &locators::DOCUMENT_CHECKBOX)
                .await?
                .into_iter()
                .next()
            else {
                log::debug!("Document {:?} has no checkbox", description);
                continue;
            };

            let field = browser.attr(&checkbox, "name").await?;
            let value = browser.attr(&checkbox, "value").await?;
            match (field, value) {
                (Some(field), Some(value)) => documents.push(Document {
                    id: DocumentId::new(field, value),
                    description,
                }),
                _ => log::debug!("Document {:?} has an incomplete checkbox", description),
            }
        }

        Ok(DocumentSet::new(documents))
    }

    /// Untick every document whose label mentions one of `unwanted`
    pub async fn deselect_unwanted<B: Browser>(&self, ui: &Ui<'_, B>, unwanted: &[&str]) -> Result<usize> {
        let browser = ui.browser();
        let mut deselected = 0;

        for label in browser.find_all(&locators::ALL_LABELS).await? {
            let text = browser.text(&label).await?;
            if unwanted.iter().any(|u| text.contains(u)) {
                log::debug!("Deselecting {:?}", text.trim());
                browser.click(&label).await?;
                deselected += 1;
            }
        }

        Ok(deselected)
    }

    /// Toggle one document's checkbox through its label
    pub async fn toggle_document<B: Browser>(&self, ui: &Ui<'_, B>, id: &DocumentId) -> Result<()> {
        let label = ui
            .find(&locators::document_label(id), ui.config().timeouts.short())
            .await?;
        Ok(ui.browser().click(&label).await?)
    }

    /// Submit the current selection and read the result
    pub async fn try_generate<B: Browser>(&self, ui: &Ui<'_, B>, user_agent: &str) -> Result<GenerationOutcome> {
        let timeouts = &ui.config().timeouts;

        ui.click(&locators::CONTINUE_BUTTON).await?;
        ui.wait(timeouts.ordering())
            .require(ui.browser(), &present(locators::BACK_BUTTON))
            .await?;
        ui.click(&locators::CONTINUE_BUTTON).await?;

        log::debug!("Waiting for the merge to finish");
        self.extract_outcome(ui, user_agent).await
    }

    async fn extract_outcome<B: Browser>(&self, ui: &Ui<'_, B>, user_agent: &str) -> Result<GenerationOutcome> {
        let browser = ui.browser();
        let timeouts = &ui.config().timeouts;

        ui.wait(timeouts.long())
            .require(browser, &invisible(locators::CONTINUE_BUTTON))
            .await?;

        let settled = any_of(vec![
            present(locators::DOWNLOAD_LINK),
            present(locators::ERROR_BLOCK),
            text_present(locators::RESULT_MESSAGE, DEFECTIVE_MERGE_TEXT),
            text_present(locators::PARAGRAPHS, ERROR_DETAILS_TEXT),
        ]);
        if !ui.wait(timeouts.short()).until(browser, &settled).await?.is_satisfied() {
            log::debug!("Result page did not settle; classifying what is there");
        }

        let mut page = ResultPage::default();
        let mut errors = Vec::new();
        for element in browser.find_all(&locators::ERROR_BLOCK).await? {
            errors.push(browser.text(&element).await?);
        }
        page.error_text = errors.join("\n");
        if let Some(link) = browser.find(&locators::DOWNLOAD_LINK).await? {
            page.download_url = browser.attr(&link, "href").await?;
        }
        if let Some(message) = browser.find(&locators::RESULT_MESSAGE).await? {
            page.result_message = Some(browser.text(&message).await?);
        }

        let outcome = match classify(&page) {
            Classification::Failed(message) => GenerationOutcome::Failed(message),
            Classification::Download(url) => {
                let cookies = browser.cookies().await?;
                GenerationOutcome::Succeeded(PdfSource {
                    url,
                    headers: vec![
                        ("Cookie".to_string(), cookie_header(&cookies)),
                        ("User-Agent".to_string(), user_agent.to_string()),
                    ],
                })
            }
            Classification::Defective => GenerationOutcome::Defective,
            Classification::Unrecognized => {
                let body = ui.text_of(&locators::BODY, timeouts.short()).await?;
                GenerationOutcome::Failed(body.trim().to_string())
            }
        };
        log::debug!("Generation outcome: {:?}", outcome);
        Ok(outcome)
    }

    /// Leave the result page with EXIT, which closes the PDF window
    pub async fn close_result_window<B: Browser>(&self, ui: &Ui<'_, B>) -> Result<WindowHandle> {
        ui.close_window(&locators::EXIT_BUTTON).await
    }
}

//! Isolating the documents that break the merge
//!
//! Each document is tried on its own. The ones that fail alone are left out
//! of a final attempt with everything else.

use super::pdf_request::{GenerationOutcome, PdfRequest};
use super::{ApplicationDoneScreen, Screen};
use crate::browser::Browser;
use crate::constants::ISOLATION_FAILED_MESSAGE;
use crate::error::Result;
use crate::events::Event;
use crate::robot::Robot;
use crate::ui::Ui;
use evision_types::{DocumentId, DocumentSet};

/// The "Manage Applicant PDF" window after a defective merge
#[derive(Debug, Default)]
pub struct TroubleshootingScreen {
    request: PdfRequest,
}

impl TroubleshootingScreen {
    pub fn new(request: PdfRequest) -> Self {
        Self { request }
    }

    pub async fn process<B: Browser>(self, robot: &mut Robot<B>) -> Result<Screen> {
        let (documents, problematic, current) = {
            let ui = robot.ui();
            self.request.wait_for_dom(&ui).await?;
            let documents = self.request.parse_documents(&ui).await?;
            log::debug!("Documents on offer: {}", documents);

            let mut current = documents.clone();
            let mut problematic = Vec::new();
            for id in documents.ids() {
                if current.description(id).is_none() {
                    log::warn!("Document {} is no longer offered; not trying it", id);
                    continue;
                }
                let (works, reparsed) = self.isolate(&ui, &current, id, robot.user_agent()).await?;
                current = reparsed;
                if !works {
                    problematic.push(id.clone());
                }
            }
            (documents, problematic, current)
        };

        let descriptions = documents.descriptions(&problematic);
        log::warn!("Problematic documents: {:?}", descriptions);
        robot.post(Event::PdfGenerationCaveat {
            problematic: descriptions,
        });

        let outcome = {
            let ui = robot.ui();
            for id in problematic.iter().filter(|id| current.description(id).is_some()) {
                self.request.toggle_document(&ui, id).await?;
            }
            match self.attempt(&ui, &current, robot.user_agent()).await?.0 {
                GenerationOutcome::Defective => GenerationOutcome::Failed(ISOLATION_FAILED_MESSAGE.to_string()),
                outcome => outcome,
            }
        };

        if let Some(event) = outcome.into_event() {
            robot.post(event);
        }

        self.request.close_result_window(&robot.ui()).await?;
        Ok(Screen::ApplicationDone(ApplicationDoneScreen))
    }

    /// Try generating with only `id` of `documents` selected. Returns whether
    /// that worked and the documents offered afterwards.
    async fn isolate<B: Browser>(
        &self,
        ui: &Ui<'_, B>,
        documents: &DocumentSet,
        id: &DocumentId,
        user_agent: &str,
    ) -> Result<(bool, DocumentSet)> {
        for other in documents.ids().filter(|other| *other != id) {
            self.request.toggle_document(ui, other).await?;
        }

        let (outcome, reparsed) = self.attempt(ui, documents, user_agent).await?;
        log::debug!(
            "Document {:?} on its own: {}",
            documents.description(id).unwrap_or_default(),
            if outcome.is_success() { "ok" } else { "problematic" }
        );
        Ok((outcome.is_success(), reparsed))
    }

    /// One generation, then back to a fresh PDF manager window. A document
    /// list that differs from `documents` is only warned about.
    async fn attempt<B: Browser>(
        &self,
        ui: &Ui<'_, B>,
        documents: &DocumentSet,
        user_agent: &str,
    ) -> Result<(GenerationOutcome, DocumentSet)> {
        let outcome = self.request.try_generate(ui, user_agent).await?;

        self.request.close_result_window(ui).await?;
        self.request.open_manager(ui).await?;
        self.request.wait_for_dom(ui).await?;

        let reparsed = self.request.parse_documents(ui).await?;
        if &reparsed != documents {
            log::warn!("Document list changed from {} to {}", documents, reparsed);
        }

        Ok((outcome, reparsed))
    }
}

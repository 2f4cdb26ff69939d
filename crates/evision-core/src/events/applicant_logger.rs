use super::{Event, EventKind, Listener};
use crate::error::Result;

/// Logs progress from one applicant to the next
#[derive(Debug, Default)]
pub struct ApplicantLogger;

impl Listener for ApplicantLogger {
    fn name(&self) -> &'static str {
        "applicant-logger"
    }

    fn interests(&self) -> &'static [EventKind] {
        &[EventKind::ApplicantChanged]
    }

    fn handle(&mut self, event: &Event) -> Result<Vec<Event>> {
        match event {
            Event::ApplicantChanged(Some(applicant)) => log::info!("Processing {}", applicant),
            Event::ApplicantChanged(None) => log::debug!("Finished with current applicant"),
            _ => {}
        }
        Ok(vec![])
    }
}

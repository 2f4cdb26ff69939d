//! Wording of the eVision pages the robot recognizes
//!
//! Tab labels contain NO-BREAK SPACEs, exactly as eVision renders them.

pub const PERSONAL_DETAILS_TAB: &str = "Personal\u{a0}Details";
pub const APPLICATION_DETAILS_TAB: &str = "Application\u{a0}Details";
pub const APPLICATION_UTILITIES_TAB: &str = "Application\u{a0}Utilities";
pub const GPO_TAB: &str = "GPO";

/// Title of the popup window opened by the "Manage Applicant PDF" button
pub const MANAGE_PDF_TITLE: &str = "Manage Applicant PDF";

pub const SURNAME_LABEL: &str = "Family Name(Surname):";
pub const PREFERRED_NAME_LABEL: &str = "Preferred Name:";
pub const GIVEN_NAME_LABEL: &str = "Given Name:";

/// Documents left out of every merged PDF, matched as label substrings
pub const UNWANTED_DOCUMENTS: &[&str] = &["Language Proficiency", "GRE"];

/// Message shown when eVision produced a merged PDF it cannot serve.
/// The typo is eVision's.
pub const DEFECTIVE_MERGE_TEXT: &str = "Please to download a copy of the document";

pub const ERROR_DETAILS_TEXT: &str = "Error details";

pub const ISOLATION_FAILED_MESSAGE: &str = "The attempt to isolate problematic documents didn't work.";

/// Overlay titles that go away on their own
pub const BUSY_OVERLAY_TITLES: &[&str] = &["Processing", "Loading"];
pub const REFRESH_OVERLAY_TITLE: &str = "Refresh?";
pub const REFRESH_DECLINE_BUTTON: &str = "No";

//! Where things are on the eVision pages

use crate::browser::{xpath_literal, Selector};
use evision_types::DocumentId;

// Application window
pub const HEADING: Selector = Selector::css_const("h3");
pub const SAVE_BUTTON: Selector = Selector::xpath_const(r#"//input[@value="Save"]"#);
pub const NEXT_APPLICANT_BUTTON: Selector =
    Selector::xpath_const(r#"//input[@value="Next Applicant"][not(@disabled)]"#);
pub const PREVIOUS_APPLICANT_BUTTON: Selector =
    Selector::xpath_const(r#"//input[@value="Previous Applicant"][not(@disabled)]"#);
pub const MANAGE_PDF_BUTTON: Selector =
    Selector::xpath_const(r#"//input[@type="button"][@value="Manage Applicant PDF"]"#);

// Manage Applicant PDF window
pub const CONTINUE_BUTTON: Selector = Selector::xpath_const(r#"//input[@value="CONTINUE"]"#);
pub const BACK_BUTTON: Selector = Selector::xpath_const(r#"//input[@value="BACK"]"#);
pub const EXIT_BUTTON: Selector = Selector::xpath_const(r#"//input[@type="button"][@value="EXIT"]"#);
pub const DOCUMENT_SELECT_LIST: Selector =
    Selector::css_const("#sitspagecontent select.sv-form-control[multiple]");
pub const DOCUMENT_LABELS: Selector =
    Selector::xpath_const(r#"//label[@class="pdf-check"][not(contains(@style, "italic"))]"#);
/// Relative to a document label
pub const DOCUMENT_CHECKBOX: Selector = Selector::xpath_const(r#"./input[@type="checkbox"]"#);
pub const ALL_LABELS: Selector = Selector::xpath_const("//label");

// Result page
pub const DOWNLOAD_LINK: Selector = Selector::link_text_const("click here");
pub const ERROR_BLOCK: Selector = Selector::xpath_const(r#"//*[font[@color="red"]]"#);
pub const RESULT_MESSAGE: Selector = Selector::css_const("#sitspagecontent div");
pub const PARAGRAPHS: Selector = Selector::css_const("p");
pub const BODY: Selector = Selector::css_const("body");

/// Anchor that activates the tab with the given title
pub fn tab_anchor(label: &str) -> Selector {
    Selector::xpath(format!(r#"//li[@role="tab"][@title={}]/a"#, xpath_literal(label)))
}

pub fn selected_tab(label: &str) -> Selector {
    Selector::xpath(format!(
        r#"//li[@role="tab"][@title={}][@aria-selected="true"]"#,
        xpath_literal(label)
    ))
}

/// Table cell whose bold label is exactly `label`
pub fn labelled_cell(label: &str) -> Selector {
    Selector::xpath(format!("//td[strong[text()={}]]", xpath_literal(label)))
}

/// The clickable label of one document
pub fn document_label(id: &DocumentId) -> Selector {
    Selector::xpath(format!(
        r#"//label[@class="pdf-check"][not(contains(@style, "italic"))][input[@type="checkbox"][@name={}][@value={}]]"#,
        xpath_literal(&id.field),
        xpath_literal(&id.value)
    ))
}

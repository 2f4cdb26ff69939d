//! Scripted stand-in for Firefox showing eVision
//!
//! Models just enough of eVision for the screens to run: a login window, the
//! application window with its tabs, and "Manage Applicant PDF" popups that
//! merge the ticked documents.

#![allow(dead_code)]

use async_trait::async_trait;
use evision_core::browser::{Browser, BrowserError, BrowserResult, Cookie, Selector};
use evision_core::clients::Fetcher;
use evision_core::constants::{
    APPLICATION_DETAILS_TAB, APPLICATION_UTILITIES_TAB, DEFECTIVE_MERGE_TEXT, GIVEN_NAME_LABEL,
    GPO_TAB, MANAGE_PDF_TITLE, PERSONAL_DETAILS_TAB, PREFERRED_NAME_LABEL, SURNAME_LABEL,
};
use evision_core::events::{
    ApplicantLogger, DownloadPool, Downloader, EventBus, Summarizer, SummaryHandle,
};
use evision_core::overlay::{OVERLAY_BUTTONS, OVERLAY_CONTENT, OVERLAY_TITLE};
use evision_core::screens::locators;
use evision_core::{EvisionConfig, Result, Robot};
use evision_types::{DocumentId, WindowHandle};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub const APPLICATION_TITLE: &str = "Graduate Admissions Decision Processing";
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const DOCUMENT_FIELD: &str = "ANSWER.TTQ.MENSYS.4";

const TABS: [&str; 4] = [
    PERSONAL_DETAILS_TAB,
    APPLICATION_DETAILS_TAB,
    APPLICATION_UTILITIES_TAB,
    GPO_TAB,
];
const NAME_LABELS: [&str; 3] = [SURNAME_LABEL, PREFERRED_NAME_LABEL, GIVEN_NAME_LABEL];

#[derive(Debug, Clone)]
pub struct FakeDocument {
    pub value: String,
    pub description: String,
    pub breaks_merge: bool,
    /// Breaks the merge only when merged with other documents
    pub clashes: bool,
}

impl FakeDocument {
    pub fn new(value: &str, description: &str) -> Self {
        Self {
            value: value.to_string(),
            description: description.to_string(),
            breaks_merge: false,
            clashes: false,
        }
    }

    pub fn broken(value: &str, description: &str) -> Self {
        Self {
            breaks_merge: true,
            ..Self::new(value, description)
        }
    }

    pub fn clashing(value: &str, description: &str) -> Self {
        Self {
            clashes: true,
            ..Self::new(value, description)
        }
    }

    pub fn id(&self) -> DocumentId {
        DocumentId::new(DOCUMENT_FIELD, self.value.clone())
    }
}

#[derive(Debug, Clone)]
pub struct FakeApplicant {
    pub number: String,
    pub surname: String,
    pub preferred: String,
    pub given: String,
    pub documents: Vec<FakeDocument>,
    pub merge_error: Option<String>,
    /// Message shown instead of a download link, without the defective-merge wording
    pub result_notice: Option<String>,
}

impl FakeApplicant {
    pub fn new(number: &str, surname: &str, preferred: &str) -> Self {
        Self {
            number: number.to_string(),
            surname: surname.to_string(),
            preferred: preferred.to_string(),
            given: preferred.to_string(),
            documents: vec![
                FakeDocument::new("93AF", "Statement of Interest"),
                FakeDocument::new("MHD:00953", "Transcripts"),
            ],
            merge_error: None,
            result_notice: None,
        }
    }

    pub fn with_given(mut self, given: &str) -> Self {
        self.given = given.to_string();
        self
    }

    pub fn with_documents(mut self, documents: Vec<FakeDocument>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_merge_error(mut self, error: &str) -> Self {
        self.merge_error = Some(error.to_string());
        self
    }

    pub fn with_result_notice(mut self, notice: &str) -> Self {
        self.result_notice = Some(notice.to_string());
        self
    }
}

/// A dialog shown when a given control is clicked
#[derive(Debug, Clone)]
pub struct FakeOverlay {
    pub title: String,
    pub buttons: Vec<String>,
    /// Staleness checks a busy dialog survives before it closes
    pub lingers_for: u32,
}

impl FakeOverlay {
    pub fn new(title: &str, buttons: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            buttons: buttons.iter().map(|b| b.to_string()).collect(),
            lingers_for: 0,
        }
    }

    pub fn lingering(mut self, checks: u32) -> Self {
        self.lingers_for = checks;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum MergeResult {
    Link(String),
    Defective,
    Error(String),
    Notice(String),
    Crashed,
}

#[derive(Debug, Clone, PartialEq)]
enum Page {
    Login,
    Application,
    ManagerSelect,
    ManagerOrdering,
    ManagerResult(MergeResult),
}

#[derive(Debug)]
struct Window {
    handle: String,
    page: Page,
    epoch: u64,
    applicant: usize,
    checked: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Heading,
    Cell(String),
    TabAnchor(String),
    SelectedTab(String),
    Save,
    Next,
    Previous,
    Manage,
    Continue,
    Back,
    Exit,
    SelectList,
    DocLabel(usize),
    DocCheckbox(usize),
    DownloadLink,
    ErrorBlock,
    ResultMessage,
    Paragraph,
    Body,
    OverlayTitle(u64),
    OverlayContent(u64),
    OverlayButton(u64, String),
}

impl Target {
    fn is_overlay(&self) -> bool {
        matches!(
            self,
            Self::OverlayTitle(_) | Self::OverlayContent(_) | Self::OverlayButton(..)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeElement {
    window: String,
    epoch: u64,
    target: Target,
}

#[derive(Debug)]
struct ActiveOverlay {
    id: u64,
    dialog: FakeOverlay,
    checks_left: u32,
}

#[derive(Debug, Default)]
struct State {
    windows: Vec<Window>,
    current: String,
    next_window: u32,
    next_overlay: u64,
    applicants: Vec<FakeApplicant>,
    index: usize,
    tab: String,
    user_logs_in: bool,
    login_pending: bool,
    overlay: Option<ActiveOverlay>,
    armed_overlays: Vec<(Selector, FakeOverlay)>,
    stale_heading_reads: u32,
    broken_details: Option<String>,
    previous_clicks: u32,
    gotos: Vec<String>,
    overlay_clicks: Vec<String>,
    merges: Vec<Vec<String>>,
    /// After this many merges the merged applicant offers these documents instead
    document_change: Option<(usize, Vec<FakeDocument>)>,
    applicants_shown: Vec<String>,
    user_agent_fails: bool,
    closed: bool,
}

/// Cheap to clone; clones share the same simulated browser
#[derive(Debug, Clone)]
pub struct FakeEvision {
    state: Arc<Mutex<State>>,
}

impl FakeEvision {
    pub fn new(applicants: Vec<FakeApplicant>) -> Self {
        let state = State {
            windows: vec![Window {
                handle: "window-1".to_string(),
                page: Page::Login,
                epoch: 0,
                applicant: 0,
                checked: vec![],
            }],
            current: "window-1".to_string(),
            next_window: 2,
            applicants,
            tab: APPLICATION_DETAILS_TAB.to_string(),
            user_logs_in: true,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// The user never opens an application after logging in
    pub fn user_never_logs_in(self) -> Self {
        self.state().user_logs_in = false;
        self
    }

    /// Show `overlay` the next time the control at `selector` is clicked
    pub fn overlay_on_click(self, selector: Selector, overlay: FakeOverlay) -> Self {
        self.state().armed_overlays.push((selector, overlay));
        self
    }

    /// The first `reads` reads of the details heading hit a redraw
    pub fn stale_heading_reads(self, reads: u32) -> Self {
        self.state().stale_heading_reads = reads;
        self
    }

    /// The details page of `number` never shows the surname until the
    /// user steps back to the previous applicant
    pub fn details_page_broken_for(self, number: &str) -> Self {
        self.state().broken_details = Some(number.to_string());
        self
    }

    /// Once `merges` merges have run, the applicant being merged offers
    /// `documents` from the next PDF manager window on
    pub fn documents_change_after_merge(self, merges: usize, documents: Vec<FakeDocument>) -> Self {
        self.state().document_change = Some((merges, documents));
        self
    }

    /// The session dies before the user agent can be read
    pub fn user_agent_fails(self) -> Self {
        self.state().user_agent_fails = true;
        self
    }

    /// Whether the session was closed
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    pub fn gotos(&self) -> Vec<String> {
        self.state().gotos.clone()
    }

    pub fn overlay_clicks(&self) -> Vec<String> {
        self.state().overlay_clicks.clone()
    }

    /// Document values ticked for each merge, in order
    pub fn merges(&self) -> Vec<Vec<String>> {
        self.state().merges.clone()
    }

    /// Student numbers whose details page was read
    pub fn applicants_shown(&self) -> Vec<String> {
        self.state().applicants_shown.clone()
    }

    pub fn previous_clicks(&self) -> u32 {
        self.state().previous_clicks
    }

    pub fn window_count(&self) -> usize {
        self.state().windows.len()
    }

    pub fn current_handle(&self) -> String {
        self.state().current.clone()
    }
}

impl State {
    fn window(&self) -> BrowserResult<&Window> {
        self.windows
            .iter()
            .find(|w| w.handle == self.current)
            .ok_or_else(|| BrowserError::NoSuchWindow(self.current.clone()))
    }

    fn window_mut(&mut self) -> BrowserResult<&mut Window> {
        let current = self.current.clone();
        self.windows
            .iter_mut()
            .find(|w| w.handle == current)
            .ok_or(BrowserError::NoSuchWindow(current))
    }

    fn open_window(&mut self, page: Page) -> String {
        let handle = format!("window-{}", self.next_window);
        self.next_window += 1;
        let checked = match page {
            Page::ManagerSelect => vec![true; self.applicants[self.index].documents.len()],
            _ => vec![],
        };
        self.windows.push(Window {
            handle: handle.clone(),
            page,
            epoch: 0,
            applicant: self.index,
            checked,
        });
        handle
    }

    fn element(&self, target: Target) -> BrowserResult<FakeElement> {
        let window = self.window()?;
        Ok(FakeElement {
            window: window.handle.clone(),
            epoch: window.epoch,
            target,
        })
    }

    /// Fail unless `element` is still part of the current page
    fn check_alive(&self, element: &FakeElement) -> BrowserResult<()> {
        let window = self.window()?;
        let alive = match &element.target {
            Target::OverlayTitle(id) | Target::OverlayContent(id) | Target::OverlayButton(id, _) => {
                self.overlay.as_ref().map(|o| o.id) == Some(*id)
            }
            _ => window.handle == element.window && window.epoch == element.epoch,
        };
        if alive {
            Ok(())
        } else {
            Err(BrowserError::StaleElement(format!("{:?}", element.target)))
        }
    }

    fn targets(&self, selector: &Selector) -> BrowserResult<Vec<Target>> {
        let window = self.window()?;

        if let Some(overlay) = &self.overlay {
            if *selector == OVERLAY_TITLE {
                return Ok(vec![Target::OverlayTitle(overlay.id)]);
            }
            if *selector == OVERLAY_CONTENT {
                return Ok(vec![Target::OverlayContent(overlay.id)]);
            }
            if *selector == OVERLAY_BUTTONS {
                return Ok(overlay
                    .dialog
                    .buttons
                    .iter()
                    .map(|b| Target::OverlayButton(overlay.id, b.clone()))
                    .collect());
            }
        }

        if *selector == locators::BODY {
            return Ok(vec![Target::Body]);
        }

        let one = |present: bool, target: Target| if present { vec![target] } else { vec![] };

        let found = match &window.page {
            Page::Login => vec![],
            Page::Application => {
                if *selector == locators::HEADING {
                    vec![Target::Heading]
                } else if *selector == locators::SAVE_BUTTON {
                    vec![Target::Save]
                } else if *selector == locators::NEXT_APPLICANT_BUTTON {
                    one(self.index + 1 < self.applicants.len(), Target::Next)
                } else if *selector == locators::PREVIOUS_APPLICANT_BUTTON {
                    one(self.index > 0, Target::Previous)
                } else if *selector == locators::MANAGE_PDF_BUTTON {
                    one(self.tab == APPLICATION_UTILITIES_TAB, Target::Manage)
                } else if let Some(tab) = TABS.iter().find(|t| *selector == locators::tab_anchor(t)) {
                    vec![Target::TabAnchor(tab.to_string())]
                } else if let Some(tab) = TABS.iter().find(|t| *selector == locators::selected_tab(t)) {
                    one(self.tab == *tab, Target::SelectedTab(tab.to_string()))
                } else if let Some(label) = NAME_LABELS.iter().find(|l| *selector == locators::labelled_cell(l)) {
                    let broken = *label == SURNAME_LABEL
                        && self.broken_details.as_deref() == Some(self.applicants[self.index].number.as_str());
                    one(self.tab == PERSONAL_DETAILS_TAB && !broken, Target::Cell(label.to_string()))
                } else {
                    vec![]
                }
            }
            Page::ManagerSelect => {
                let documents = &self.applicants[window.applicant].documents;
                if *selector == locators::CONTINUE_BUTTON {
                    vec![Target::Continue]
                } else if *selector == locators::EXIT_BUTTON {
                    vec![Target::Exit]
                } else if *selector == locators::DOCUMENT_SELECT_LIST {
                    vec![Target::SelectList]
                } else if *selector == locators::DOCUMENT_LABELS || *selector == locators::ALL_LABELS {
                    (0..documents.len()).map(Target::DocLabel).collect()
                } else if let Some(i) = documents
                    .iter()
                    .position(|d| *selector == locators::document_label(&d.id()))
                {
                    vec![Target::DocLabel(i)]
                } else {
                    vec![]
                }
            }
            Page::ManagerOrdering => {
                if *selector == locators::CONTINUE_BUTTON {
                    vec![Target::Continue]
                } else if *selector == locators::BACK_BUTTON {
                    vec![Target::Back]
                } else if *selector == locators::EXIT_BUTTON {
                    vec![Target::Exit]
                } else {
                    vec![]
                }
            }
            Page::ManagerResult(result) => {
                if *selector == locators::EXIT_BUTTON {
                    vec![Target::Exit]
                } else if *selector == locators::RESULT_MESSAGE {
                    one(
                        matches!(
                            result,
                            MergeResult::Link(_) | MergeResult::Defective | MergeResult::Notice(_)
                        ),
                        Target::ResultMessage,
                    )
                } else if *selector == locators::DOWNLOAD_LINK {
                    one(matches!(result, MergeResult::Link(_)), Target::DownloadLink)
                } else if *selector == locators::ERROR_BLOCK {
                    one(matches!(result, MergeResult::Error(_)), Target::ErrorBlock)
                } else if *selector == locators::PARAGRAPHS {
                    one(matches!(result, MergeResult::Crashed), Target::Paragraph)
                } else {
                    vec![]
                }
            }
        };
        Ok(found)
    }

    fn merge(&mut self) -> BrowserResult<MergeResult> {
        let window = self.window()?;
        let applicant = &self.applicants[window.applicant];
        let ticked: Vec<&FakeDocument> = applicant
            .documents
            .iter()
            .zip(&window.checked)
            .filter(|(_, checked)| **checked)
            .map(|(document, _)| document)
            .collect();

        let result = if let Some(error) = &applicant.merge_error {
            MergeResult::Error(error.clone())
        } else if let Some(notice) = &applicant.result_notice {
            MergeResult::Notice(notice.clone())
        } else if ticked.is_empty() {
            MergeResult::Crashed
        } else if ticked.iter().any(|d| d.breaks_merge)
            || (ticked.len() > 1 && ticked.iter().any(|d| d.clashes))
        {
            MergeResult::Defective
        } else {
            MergeResult::Link(format!(
                "https://evision.example/pdf/{}-{}.pdf",
                applicant.number,
                self.merges.len() + 1
            ))
        };

        let merged = window.applicant;
        let values = ticked.iter().map(|d| d.value.clone()).collect();
        self.merges.push(values);

        if self.document_change.as_ref().map(|(after, _)| *after) == Some(self.merges.len()) {
            if let Some((_, documents)) = self.document_change.take() {
                self.applicants[merged].documents = documents;
            }
        }
        Ok(result)
    }

    fn navigate(&mut self, page: Page) -> BrowserResult<()> {
        let window = self.window_mut()?;
        window.page = page;
        window.epoch += 1;
        Ok(())
    }

    fn click(&mut self, element: &FakeElement) -> BrowserResult<()> {
        self.check_alive(element)?;

        if self.overlay.is_some() && !element.target.is_overlay() {
            return Err(BrowserError::ClickIntercepted(format!("{:?}", element.target)));
        }

        let selector_hit = self
            .armed_overlays
            .iter()
            .position(|(selector, _)| {
                self.targets(selector)
                    .map(|targets| targets.contains(&element.target))
                    .unwrap_or(false)
            });
        if let Some(position) = selector_hit {
            let (_, dialog) = self.armed_overlays.remove(position);
            self.next_overlay += 1;
            self.overlay = Some(ActiveOverlay {
                id: self.next_overlay,
                checks_left: dialog.lingers_for,
                dialog,
            });
            return Err(BrowserError::ClickIntercepted(format!("{:?}", element.target)));
        }

        match &element.target {
            Target::TabAnchor(tab) => {
                self.tab = tab.clone();
            }
            Target::Next => {
                self.index += 1;
                self.navigate(Page::Application)?;
            }
            Target::Previous => {
                self.index -= 1;
                self.previous_clicks += 1;
                self.broken_details = None;
                self.navigate(Page::Application)?;
            }
            Target::Manage => {
                self.open_window(Page::ManagerSelect);
            }
            Target::DocLabel(i) => {
                let window = self.window_mut()?;
                window.checked[*i] = !window.checked[*i];
            }
            Target::Continue => {
                let page = self.window()?.page.clone();
                match page {
                    Page::ManagerSelect => self.navigate(Page::ManagerOrdering)?,
                    Page::ManagerOrdering => {
                        let result = self.merge()?;
                        self.navigate(Page::ManagerResult(result))?;
                    }
                    _ => {}
                }
            }
            Target::Exit => {
                let current = self.current.clone();
                self.windows.retain(|w| w.handle != current);
            }
            Target::OverlayButton(_, label) => {
                self.overlay_clicks.push(label.clone());
                if label == "No" {
                    self.overlay = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, element: &FakeElement) -> BrowserResult<String> {
        self.check_alive(element)?;
        if element.target == Target::Heading {
            if self.stale_heading_reads > 0 {
                self.stale_heading_reads -= 1;
                return Err(BrowserError::StaleElement("heading redrawn".to_string()));
            }
            let number = self.applicants[self.index].number.clone();
            self.applicants_shown.push(number);
        }

        let window = self.window()?;
        let applicant = &self.applicants[self.index];
        let text = match &element.target {
            Target::Heading => format!(
                "Application 1 for {}, {} - Student No: {} (Master of Science)",
                applicant.surname.to_uppercase(),
                applicant.given,
                applicant.number
            ),
            Target::Cell(label) => {
                let value = match label.as_str() {
                    SURNAME_LABEL => &applicant.surname,
                    PREFERRED_NAME_LABEL => &applicant.preferred,
                    _ => &applicant.given,
                };
                format!("{} {}", label, value)
            }
            Target::TabAnchor(tab) | Target::SelectedTab(tab) => tab.clone(),
            Target::DocLabel(i) => format!(" {} ", self.applicants[window.applicant].documents[*i].description),
            Target::ErrorBlock => match &window.page {
                Page::ManagerResult(MergeResult::Error(error)) => error.clone(),
                _ => String::new(),
            },
            Target::ResultMessage => match &window.page {
                Page::ManagerResult(MergeResult::Defective) => DEFECTIVE_MERGE_TEXT.to_string(),
                Page::ManagerResult(MergeResult::Notice(notice)) => notice.clone(),
                _ => "Please click here to download a copy of the document".to_string(),
            },
            Target::Paragraph => "Error details".to_string(),
            Target::Body => match &window.page {
                Page::ManagerResult(MergeResult::Crashed) => {
                    "Error details\nNo documents were selected for the merge".to_string()
                }
                Page::ManagerResult(MergeResult::Notice(notice)) => format!("eVision\n{}", notice),
                _ => "eVision".to_string(),
            },
            Target::OverlayTitle(_) => self.overlay.as_ref().map(|o| o.dialog.title.clone()).unwrap_or_default(),
            Target::OverlayContent(_) => "Please wait".to_string(),
            Target::OverlayButton(_, label) => label.clone(),
            Target::Save => "Save".to_string(),
            Target::Next => "Next Applicant".to_string(),
            Target::Previous => "Previous Applicant".to_string(),
            Target::Manage => "Manage Applicant PDF".to_string(),
            Target::Continue => "CONTINUE".to_string(),
            Target::Back => "BACK".to_string(),
            Target::Exit => "EXIT".to_string(),
            Target::SelectList | Target::DocCheckbox(_) => String::new(),
            Target::DownloadLink => "click here".to_string(),
        };
        Ok(text)
    }

    fn is_displayed(&mut self, element: &FakeElement) -> BrowserResult<bool> {
        self.check_alive(element)?;
        match element.target {
            Target::SelectList => Ok(false),
            Target::OverlayTitle(_) => {
                let overlay = self.overlay.as_mut().map(|o| {
                    let gone = o.checks_left == 0;
                    o.checks_left = o.checks_left.saturating_sub(1);
                    gone
                });
                match overlay {
                    Some(true) if self.is_busy_overlay() => {
                        self.overlay = None;
                        Err(BrowserError::StaleElement("overlay closed".to_string()))
                    }
                    _ => Ok(true),
                }
            }
            _ => Ok(true),
        }
    }

    fn is_busy_overlay(&self) -> bool {
        self.overlay
            .as_ref()
            .map(|o| o.dialog.title == "Processing" || o.dialog.title == "Loading")
            .unwrap_or(false)
    }
}

#[async_trait]
impl Browser for FakeEvision {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        let mut state = self.state();
        state.gotos.push(url.to_string());
        state.login_pending = state.user_logs_in;
        Ok(())
    }

    async fn find_all(&self, selector: &Selector) -> BrowserResult<Vec<FakeElement>> {
        let state = self.state();
        state
            .targets(selector)?
            .into_iter()
            .map(|target| state.element(target))
            .collect()
    }

    async fn find_all_within(&self, parent: &FakeElement, selector: &Selector) -> BrowserResult<Vec<FakeElement>> {
        let state = self.state();
        state.check_alive(parent)?;
        match parent.target {
            Target::DocLabel(i) if *selector == locators::DOCUMENT_CHECKBOX => {
                Ok(vec![state.element(Target::DocCheckbox(i))?])
            }
            _ => Ok(vec![]),
        }
    }

    async fn click(&self, element: &FakeElement) -> BrowserResult<()> {
        self.state().click(element)
    }

    async fn text(&self, element: &FakeElement) -> BrowserResult<String> {
        self.state().text(element)
    }

    async fn attr(&self, element: &FakeElement, name: &str) -> BrowserResult<Option<String>> {
        let state = self.state();
        state.check_alive(element)?;
        let window = state.window()?;
        Ok(match (&element.target, name) {
            (Target::DocCheckbox(_), "name") => Some(DOCUMENT_FIELD.to_string()),
            (Target::DocCheckbox(i), "value") => {
                Some(state.applicants[window.applicant].documents[*i].value.clone())
            }
            (Target::DownloadLink, "href") => match &window.page {
                Page::ManagerResult(MergeResult::Link(url)) => Some(url.clone()),
                _ => None,
            },
            _ => None,
        })
    }

    async fn is_displayed(&self, element: &FakeElement) -> BrowserResult<bool> {
        self.state().is_displayed(element)
    }

    async fn title(&self) -> BrowserResult<String> {
        let mut state = self.state();
        // The user opens the application while we watch the login page
        if state.login_pending && state.window()?.page == Page::Login {
            state.login_pending = false;
            state.open_window(Page::Application);
        }
        Ok(match state.window()?.page {
            Page::Login => "eVision Login".to_string(),
            Page::Application => APPLICATION_TITLE.to_string(),
            _ => MANAGE_PDF_TITLE.to_string(),
        })
    }

    async fn window_handles(&self) -> BrowserResult<Vec<WindowHandle>> {
        Ok(self
            .state()
            .windows
            .iter()
            .map(|w| WindowHandle::new(w.handle.clone()))
            .collect())
    }

    async fn current_window(&self) -> BrowserResult<WindowHandle> {
        let state = self.state();
        Ok(WindowHandle::new(state.window()?.handle.clone()))
    }

    async fn switch_to_window(&self, handle: &WindowHandle) -> BrowserResult<()> {
        let mut state = self.state();
        if state.windows.iter().any(|w| w.handle == handle.as_str()) {
            state.current = handle.as_str().to_string();
            Ok(())
        } else {
            Err(BrowserError::NoSuchWindow(handle.to_string()))
        }
    }

    async fn cookies(&self) -> BrowserResult<Vec<Cookie>> {
        Ok(vec![Cookie::new("JSESSIONID", "abc123"), Cookie::new("lb", "node1")])
    }

    async fn user_agent(&self) -> BrowserResult<String> {
        if self.state().user_agent_fails {
            return Err(BrowserError::Session("Session deleted".to_string()));
        }
        Ok(USER_AGENT.to_string())
    }

    async fn close(self) -> BrowserResult<()> {
        let mut state = self.state();
        state.closed = true;
        state.windows.clear();
        Ok(())
    }
}

/// Records requests and writes a small PDF for each
#[derive(Debug, Clone, Default)]
pub struct RecordingFetcher {
    requests: Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>,
}

impl RecordingFetcher {
    pub fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for RecordingFetcher {
    async fn fetch(&self, url: &str, headers: &[(String, String)], dest: &Path) -> Result<u64> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), headers.to_vec()));
        let body = b"%PDF-1.4 fake";
        tokio::fs::write(dest, body).await?;
        Ok(body.len() as u64)
    }
}

/// Timeouts short enough for tests, long enough for the fake
pub fn test_config() -> EvisionConfig {
    let mut config = EvisionConfig::default();
    config.application_title = APPLICATION_TITLE.to_string();
    config.timeouts.poll_interval_ms = 1;
    config.timeouts.confirm_secs = 1;
    config.timeouts.short_secs = 1;
    config.timeouts.medium_secs = 1;
    config.timeouts.ordering_secs = 1;
    config.timeouts.long_secs = 2;
    config.timeouts.window_close_secs = 1;
    config.click_attempts = 5;
    config.tab_attempts = 2;
    config.resync_attempts = 1;
    config
}

pub struct Harness {
    pub fake: FakeEvision,
    pub fetcher: RecordingFetcher,
    pub summary: SummaryHandle,
    pub dest_dir: tempfile::TempDir,
    pub robot: Robot<FakeEvision>,
}

impl Harness {
    pub fn dest(&self, file_name: &str) -> PathBuf {
        self.dest_dir.path().join(file_name)
    }
}

/// A robot wired up the way the binary wires it, around `fake`
pub async fn harness(fake: FakeEvision) -> Harness {
    let dest_dir = tempfile::tempdir().unwrap();
    let fetcher = RecordingFetcher::default();
    let (pool, completions) = DownloadPool::new(Arc::new(fetcher.clone()), 2);

    let summarizer = Summarizer::new(None);
    let summary = summarizer.summary_handle();

    let mut bus = EventBus::new();
    bus.register(ApplicantLogger);
    bus.register(Downloader::new(dest_dir.path(), pool.clone()));
    bus.register(summarizer);

    let robot = Robot::start(fake.clone(), test_config(), bus, pool, completions, std::future::pending())
        .await
        .unwrap()
        .unwrap();

    Harness {
        fake,
        fetcher,
        summary,
        dest_dir,
        robot,
    }
}

/// Log in and bring the application window to the front without a robot
pub async fn show_application(fake: &FakeEvision) -> WindowHandle {
    fake.goto("https://evision.example/").await.unwrap();
    fake.title().await.unwrap();
    let handle = WindowHandle::new("window-2");
    fake.switch_to_window(&handle).await.unwrap();
    handle
}

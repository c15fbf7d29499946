use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::criteria::{RawParams, SortKey};
use crate::catalog::router::FILTER_ACTION;
use crate::catalog::service::FilterOutcome;

use super::html;

/// Result layout selected by the view toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "grid" | "blocks" => Some(Self::Grid),
            "list" => Some(Self::List),
            _ => None,
        }
    }
}

/// User interaction with the filter page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Form submitted with the given field values.
    Submit(BTreeMap<String, String>),
    Reset,
    ChangeSort(SortKey),
    GoToPage(u32),
    SwitchView(ViewMode),
}

/// Parameters of one filter round trip, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub params: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn to_raw_params(&self) -> RawParams {
        self.params.iter().cloned().collect()
    }
}

/// How a round trip ended, as seen by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(FilterOutcome),
    /// The server answered with `success: false` and a message.
    Rejected(String),
    /// Network or server failure; never retried.
    TransportFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub results_html: String,
    pub pagination_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEffect {
    Fetch(FetchRequest),
    Render(RenderedView),
    Nothing,
}

/// Explicit client state: view, sort, page, the submitted form and the last fetched page.
#[derive(Debug, Clone)]
pub struct ViewState {
    view: ViewMode,
    sort: SortKey,
    page: u32,
    form: BTreeMap<String, String>,
    nonce: String,
    last_page: Option<FilterOutcome>,
}

impl ViewState {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self {
            view: ViewMode::default(),
            sort: SortKey::default(),
            page: 1,
            form: BTreeMap::new(),
            nonce: nonce.into(),
            last_page: None,
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn last_page(&self) -> Option<&FilterOutcome> {
        self.last_page.as_ref()
    }

    /// Request for the current state; used for the initial load.
    pub fn initial_fetch(&self) -> FetchRequest {
        self.fetch_request()
    }

    pub fn apply(&mut self, action: ViewAction) -> ViewEffect {
        match action {
            ViewAction::Submit(form) => {
                self.form = form;
                self.page = 1;
                ViewEffect::Fetch(self.fetch_request())
            }
            ViewAction::Reset => {
                self.form.clear();
                self.page = 1;
                ViewEffect::Fetch(self.fetch_request())
            }
            ViewAction::ChangeSort(sort) => {
                self.sort = sort;
                self.page = 1;
                ViewEffect::Fetch(self.fetch_request())
            }
            ViewAction::GoToPage(page) => {
                self.page = page.max(1);
                ViewEffect::Fetch(self.fetch_request())
            }
            ViewAction::SwitchView(view) => {
                if view == self.view {
                    return ViewEffect::Nothing;
                }
                self.view = view;
                match &self.last_page {
                    Some(outcome) => ViewEffect::Render(self.render(outcome)),
                    None => ViewEffect::Nothing,
                }
            }
        }
    }

    /// Applies a finished round trip. Responses are applied in arrival order, so a late
    /// response overwrites an earlier one.
    pub fn receive(&mut self, outcome: FetchOutcome) -> RenderedView {
        match outcome {
            FetchOutcome::Success(page) => {
                let rendered = self.render(&page);
                self.last_page = Some(page);
                rendered
            }
            FetchOutcome::Rejected(message) => RenderedView {
                results_html: html::render_error(&message),
                pagination_html: String::new(),
            },
            FetchOutcome::TransportFailure => RenderedView {
                results_html: html::render_message(html::TRANSPORT_ERROR_MESSAGE),
                pagination_html: String::new(),
            },
        }
    }

    fn render(&self, outcome: &FilterOutcome) -> RenderedView {
        RenderedView {
            results_html: html::render_results(&outcome.results, self.view),
            pagination_html: html::render_pagination(&outcome.pagination),
        }
    }

    fn fetch_request(&self) -> FetchRequest {
        let mut params: Vec<(String, String)> = self
            .form
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "page" | "sort" | "action" | "nonce"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("sort".to_string(), self.sort.as_str().to_string()));
        params.push(("action".to_string(), FILTER_ACTION.to_string()));
        params.push(("nonce".to_string(), self.nonce.clone()));
        FetchRequest { params }
    }
}

pub mod debounce;
pub mod events;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pager::{self, Page, DEFAULT_PAGE_SIZE};
use crate::query::{self, Criteria, Filter};
use crate::record::{Field, Record};

pub use debounce::Debouncer;
pub use events::{drive, PageMove, SessionEvent};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Cards,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Table => f.write_str("table"),
            ViewMode::Cards => f.write_str("cards"),
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "table" => Ok(ViewMode::Table),
            "cards" | "card" => Ok(ViewMode::Cards),
            other => Err(format!("unknown view '{other}', expected table or cards")),
        }
    }
}

/// Session-scoped UI state. Only the `Session` transitions mutate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub criteria: Criteria,
    pub page: usize,
    pub page_size: usize,
    pub view: ViewMode,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            criteria: Criteria::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            view: ViewMode::Table,
        }
    }
}

/// Receives every recomputed page.
pub trait Render {
    fn render(&mut self, page: &Page<'_>, state: &QueryState);
}

impl<F> Render for F
where
    F: FnMut(&Page<'_>, &QueryState),
{
    fn render(&mut self, page: &Page<'_>, state: &QueryState) {
        self(page, state)
    }
}

/// Owns the loaded records, the query state and the renderer.
///
/// Every transition updates the state and then recomputes
/// query → pager → render from scratch.
pub struct Session<R> {
    records: Vec<Record>,
    state: QueryState,
    renderer: R,
}

impl<R: Render> Session<R> {
    /// Creates a session without rendering; the first `load` renders.
    pub fn new(state: QueryState, renderer: R) -> Self {
        Self {
            records: Vec::new(),
            state,
            renderer,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Replaces the record set wholesale.
    pub fn load(&mut self, records: Vec<Record>) {
        info!(records = records.len(), "record set loaded");
        self.records = records;
        self.refresh();
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.state.criteria.text = text.into();
        self.state.page = 1;
        self.refresh();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.state.criteria.filter = filter;
        self.state.page = 1;
        self.refresh();
    }

    /// Flips direction on the active key, otherwise switches key at its default direction.
    pub fn set_sort(&mut self, key: Field) {
        self.state.criteria.sort = self.state.criteria.sort.toggled(key);
        self.refresh();
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page.max(1);
        self.refresh();
    }

    pub fn move_page(&mut self, to: PageMove) {
        let page = match to {
            PageMove::First => 1,
            PageMove::Prev => self.state.page.saturating_sub(1),
            PageMove::Next => self.state.page.saturating_add(1),
            PageMove::Last => usize::MAX,
        };
        self.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.page_size = page_size.max(1);
        self.state.page = 1;
        self.refresh();
    }

    /// No-op when `view` is already active.
    pub fn set_view(&mut self, view: ViewMode) {
        if self.state.view == view {
            return;
        }
        self.state.view = view;
        self.refresh();
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Query(text) => self.set_query(text),
            SessionEvent::Filter(filter) => self.set_filter(filter),
            SessionEvent::Sort(key) => self.set_sort(key),
            SessionEvent::Page(page) => self.set_page(page),
            SessionEvent::Move(to) => self.move_page(to),
            SessionEvent::PageSize(size) => self.set_page_size(size),
            SessionEvent::View(view) => self.set_view(view),
        }
    }

    fn refresh(&mut self) {
        let matched = query::query(&self.records, &self.state.criteria);
        let page = pager::paginate(&matched, self.state.page, self.state.page_size);
        if page.page != self.state.page {
            debug!(requested = self.state.page, clamped = page.page, "page clamped");
        }
        self.state.page = page.page;
        self.renderer.render(&page, &self.state);
    }
}

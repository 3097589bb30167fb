//! Render targets and the view models written to them.
//!
//! The core never reads state back from a target except for visibility.
//! Every target is optional; components skip work for targets that are not
//! attached.

use url::form_urlencoded;

use crate::find::Span;

pub const RESULTS_PAGE: &str = "search-results.html";

pub trait ContentArea {
    fn set_html(&mut self, html: &str);
    /// Scrolls the element with id `anchor` into view. Returns `false` when
    /// no such element exists.
    fn scroll_to_anchor(&mut self, anchor: &str) -> bool;
    fn scroll_to_top(&mut self);
}

pub trait LoadingIndicator {
    fn set_visible(&mut self, visible: bool);
}

pub trait SearchInput {
    fn clear(&mut self);
}

pub trait ResultSurface {
    fn render(&mut self, dropdown: &Dropdown);
    fn set_active(&mut self, index: Option<usize>);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
}

/// Owner of the full results view, reached only through "view all".
pub trait ResultsPage {
    fn open(&mut self, view_all: &ViewAll);
}

pub trait SidebarList {
    fn render(&mut self, rows: &[SidebarRow]);
}

pub trait OverlayPanel {
    fn show(&mut self, overlay: &OverlayView);
    fn hide(&mut self);
    fn is_visible(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultRow {
    pub id: String,
    pub icon: String,
    pub name: Vec<Span>,
    pub symbol: String,
    pub category: String,
}

impl ResultRow {
    pub fn meta(&self) -> String {
        if self.category.is_empty() {
            self.symbol.clone()
        } else {
            format!("{} • {}", self.symbol, self.category)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultGroup {
    pub heading: String,
    pub rows: Vec<ResultRow>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewAll {
    pub query: String,
    pub total: usize,
}

impl ViewAll {
    pub fn label(&self) -> String {
        format!("View all {} results", self.total)
    }

    pub fn href(&self) -> String {
        let query: String = form_urlencoded::byte_serialize(self.query.as_bytes()).collect();
        format!("{RESULTS_PAGE}?q={query}")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dropdown {
    Results {
        groups: Vec<ResultGroup>,
        view_all: Option<ViewAll>,
    },
    NoResults {
        query: String,
    },
    Recent {
        group: ResultGroup,
    },
}

impl Dropdown {
    /// Selectable rows in display order; active indices refer to this order.
    pub fn rows(&self) -> Vec<&ResultRow> {
        match self {
            Self::Results { groups, .. } => groups.iter().flat_map(|g| &g.rows).collect(),
            Self::NoResults { .. } => Vec::new(),
            Self::Recent { group } => group.rows.iter().collect(),
        }
    }

    pub fn view_all(&self) -> Option<&ViewAll> {
        match self {
            Self::Results { view_all, .. } => view_all.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarRow {
    pub id: String,
    pub icon: String,
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayView {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<String>,
}

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    catalog::{CatalogSource, Instrument},
    debounce::{Debounce, TimerToken},
    find::{FindQuery, Span},
    recent::{RecentEntry, RecentList},
    router::{PageRequest, Router},
    view::{Dropdown, ResultGroup, ResultRow, ResultSurface, ResultsPage, SearchInput, ViewAll},
};

pub const RECENT_HEADING: &str = "Recent";

#[derive(Copy, Clone, Debug)]
pub struct SearchOptions {
    pub debounce: Duration,
    pub results_per_group: usize,
    /// "View all" shows up once the total exceeds this.
    pub view_all_threshold: usize,
    pub recent_rows: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            results_per_group: 5,
            view_all_threshold: 10,
            recent_rows: 5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    Other,
}

#[derive(Clone, Debug, Default)]
pub struct SearchSession {
    pub query: String,
    pub results: Vec<Arc<Instrument>>,
    pub dropdown: Option<Dropdown>,
    pub active: Option<usize>,
}

pub struct SearchController {
    catalog: Arc<dyn CatalogSource>,
    options: SearchOptions,
    debounce: Debounce,
    session: SearchSession,
    surface: Option<Box<dyn ResultSurface>>,
    input: Option<Box<dyn SearchInput>>,
    results_page: Option<Box<dyn ResultsPage>>,
}

impl SearchController {
    pub fn new(catalog: Arc<dyn CatalogSource>, options: SearchOptions) -> Self {
        Self {
            catalog,
            options,
            debounce: Debounce::trailing(options.debounce),
            session: SearchSession::default(),
            surface: None,
            input: None,
            results_page: None,
        }
    }

    pub fn attach_surface(&mut self, surface: Box<dyn ResultSurface>) {
        self.surface.replace(surface);
    }

    pub fn attach_input(&mut self, input: Box<dyn SearchInput>) {
        self.input.replace(input);
    }

    pub fn attach_results_page(&mut self, page: Box<dyn ResultsPage>) {
        self.results_page.replace(page);
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn is_visible(&self) -> bool {
        self.surface.as_ref().is_some_and(|s| s.is_visible())
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }
}

// Input and timers.
impl SearchController {
    pub fn handle_input(&mut self, raw: &str, now: Instant, recent: &RecentList) -> TimerToken {
        self.session.query = raw.to_owned();
        if raw.trim().is_empty() {
            self.debounce.cancel();
            self.show_recent(recent);
            TimerToken::INVALID
        } else {
            self.debounce.request(now)
        }
    }

    pub fn handle_focus(&mut self, recent: &RecentList) {
        if self.session.query.trim().is_empty() {
            self.show_recent(recent);
        }
    }

    /// Runs the pending search if its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.debounce.fire_due(now) {
            self.run_search();
            true
        } else {
            false
        }
    }

    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        if self.debounce.fire(token) {
            self.run_search();
            true
        } else {
            false
        }
    }

    fn run_search(&mut self) {
        let query = self.session.query.clone();
        let results = self.catalog.search(&query);
        log::debug!("search {:?}: {} results", query, results.len());
        let dropdown = build_dropdown(&query, &results, &self.options);
        self.session.results = results;
        self.render(dropdown);
    }

    fn show_recent(&mut self, recent: &RecentList) {
        self.session.results.clear();
        let rows: Vec<ResultRow> = recent
            .entries()
            .iter()
            .take(self.options.recent_rows)
            .map(recent_row)
            .collect();
        if rows.is_empty() {
            self.hide();
            return;
        }
        self.render(Dropdown::Recent {
            group: ResultGroup {
                heading: RECENT_HEADING.to_string(),
                rows,
            },
        });
    }

    fn render(&mut self, dropdown: Dropdown) {
        self.session.active = None;
        if let Some(surface) = &mut self.surface {
            surface.render(&dropdown);
        }
        self.session.dropdown = Some(dropdown);
    }
}

// Selection and keyboard.
impl SearchController {
    pub fn handle_key(&mut self, key: Key, router: &mut Router) -> Option<PageRequest> {
        if !self.is_visible() {
            return None;
        }
        match key {
            Key::ArrowDown => self.move_active(1),
            Key::ArrowUp => self.move_active(-1),
            Key::Enter => {
                let id = self.active_row_id()?;
                return self.select(&id, router);
            }
            Key::Escape => self.hide(),
            Key::Other => {}
        }
        None
    }

    /// Activates the row for `id`, whether clicked or chosen by keyboard.
    pub fn select(&mut self, id: &str, router: &mut Router) -> Option<PageRequest> {
        self.hide();
        self.debounce.cancel();
        self.session.query.clear();
        if let Some(input) = &mut self.input {
            input.clear();
        }
        router.navigate_to(id, None)
    }

    pub fn open_view_all(&mut self) {
        let Some(view_all) = self
            .session
            .dropdown
            .as_ref()
            .and_then(|d| d.view_all())
            .cloned()
        else {
            return;
        };
        self.hide();
        match &mut self.results_page {
            Some(page) => page.open(&view_all),
            None => log::warn!("no results page for {:?}", view_all.query),
        }
    }

    pub fn handle_outside_click(&mut self) {
        self.hide();
    }

    pub fn hide(&mut self) {
        self.session.active = None;
        if let Some(surface) = &mut self.surface {
            surface.hide();
        }
    }

    fn row_count(&self) -> usize {
        self.session
            .dropdown
            .as_ref()
            .map_or(0, |d| d.rows().len())
    }

    fn active_row_id(&self) -> Option<String> {
        let index = self.session.active?;
        let dropdown = self.session.dropdown.as_ref()?;
        dropdown.rows().get(index).map(|row| row.id.clone())
    }

    fn move_active(&mut self, delta: isize) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let next = match self.session.active {
            Some(index) => (index as isize + delta).rem_euclid(count as isize) as usize,
            None if delta > 0 => 0,
            None => count - 1,
        };
        self.session.active = Some(next);
        if let Some(surface) = &mut self.surface {
            surface.set_active(Some(next));
        }
    }
}

/// Groups `results` by category in first-seen order, capping each group.
pub fn group_results(
    query: &str,
    results: &[Arc<Instrument>],
    per_group: usize,
) -> Vec<ResultGroup> {
    let find = FindQuery::new(query);
    let mut groups: Vec<ResultGroup> = Vec::new();
    for item in results {
        let index = match groups.iter().position(|g| g.heading == item.category) {
            Some(index) => index,
            None => {
                groups.push(ResultGroup {
                    heading: item.category.clone(),
                    rows: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        if group.rows.len() < per_group {
            group.rows.push(ResultRow {
                id: item.id.clone(),
                icon: item.icon.clone(),
                name: find.highlight(&item.name),
                symbol: item.symbol.clone(),
                category: item.category.clone(),
            });
        }
    }
    groups
}

pub fn build_dropdown(query: &str, results: &[Arc<Instrument>], options: &SearchOptions) -> Dropdown {
    if results.is_empty() {
        return Dropdown::NoResults {
            query: query.to_owned(),
        };
    }
    let total = results.len();
    Dropdown::Results {
        groups: group_results(query, results, options.results_per_group),
        view_all: (total > options.view_all_threshold).then(|| ViewAll {
            query: query.to_owned(),
            total,
        }),
    }
}

fn recent_row(entry: &RecentEntry) -> ResultRow {
    ResultRow {
        id: entry.id.clone(),
        icon: entry.icon.clone(),
        name: vec![Span::plain(entry.name.clone())],
        symbol: entry.symbol.clone(),
        category: entry.category.clone(),
    }
}

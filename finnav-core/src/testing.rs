//! Fakes and fixtures shared by the unit tests.

use std::{
    cell::RefCell,
    collections::HashSet,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use url::Url;

use crate::{
    catalog::{Catalog, CatalogSource, Instrument},
    content::ContentSource,
    error::Error,
    router::{Router, RouterOptions},
    store::{MemoryStore, PersistentStore},
    view::{
        ContentArea, Dropdown, LoadingIndicator, OverlayPanel, OverlayView, ResultSurface,
        ResultsPage, SearchInput, SidebarList, SidebarRow, ViewAll,
    },
};

pub const DEFAULT_LOCATION: &str = "http://localhost/index.html";

pub fn instrument(id: &str, name: &str, symbol: &str, category: &str) -> Instrument {
    Instrument {
        id: id.into(),
        name: name.into(),
        symbol: symbol.into(),
        category: category.into(),
        icon: "•".into(),
        description: String::new(),
        content_ref: format!("pages/{id}.html"),
        sections: ["Overview", "Charts", "Fees & Expenses", "News & Analysis"]
            .map(String::from)
            .to_vec(),
        is_template: false,
    }
}

/// Everything the render targets were told, in one place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewLog {
    pub html: String,
    pub loading: Vec<bool>,
    pub scrolled_to_top: usize,
    pub anchors: Vec<String>,
    pub dropdown: Option<Dropdown>,
    pub dropdown_visible: bool,
    pub active: Option<usize>,
    pub input_cleared: usize,
    pub sidebar: Vec<SidebarRow>,
    pub overlay: Option<OverlayView>,
    pub overlay_visible: bool,
    pub opened_results: Vec<ViewAll>,
}

pub type SharedView = Rc<RefCell<ViewLog>>;

impl ContentArea for SharedView {
    fn set_html(&mut self, html: &str) {
        self.borrow_mut().html = html.to_owned();
    }

    fn scroll_to_anchor(&mut self, anchor: &str) -> bool {
        let mut log = self.borrow_mut();
        log.anchors.push(anchor.to_owned());
        log.html.contains(&format!("id=\"{anchor}\""))
    }

    fn scroll_to_top(&mut self) {
        self.borrow_mut().scrolled_to_top += 1;
    }
}

impl LoadingIndicator for SharedView {
    fn set_visible(&mut self, visible: bool) {
        self.borrow_mut().loading.push(visible);
    }
}

impl SearchInput for SharedView {
    fn clear(&mut self) {
        self.borrow_mut().input_cleared += 1;
    }
}

impl ResultSurface for SharedView {
    fn render(&mut self, dropdown: &Dropdown) {
        let mut log = self.borrow_mut();
        log.dropdown = Some(dropdown.clone());
        log.dropdown_visible = true;
        log.active = None;
    }

    fn set_active(&mut self, index: Option<usize>) {
        self.borrow_mut().active = index;
    }

    fn hide(&mut self) {
        let mut log = self.borrow_mut();
        log.dropdown_visible = false;
        log.active = None;
    }

    fn is_visible(&self) -> bool {
        self.borrow().dropdown_visible
    }
}

impl ResultsPage for SharedView {
    fn open(&mut self, view_all: &ViewAll) {
        self.borrow_mut().opened_results.push(view_all.clone());
    }
}

impl SidebarList for SharedView {
    fn render(&mut self, rows: &[SidebarRow]) {
        self.borrow_mut().sidebar = rows.to_vec();
    }
}

impl OverlayPanel for SharedView {
    fn show(&mut self, overlay: &OverlayView) {
        let mut log = self.borrow_mut();
        log.overlay = Some(overlay.clone());
        log.overlay_visible = true;
    }

    fn hide(&mut self) {
        self.borrow_mut().overlay_visible = false;
    }

    fn is_visible(&self) -> bool {
        self.borrow().overlay_visible
    }
}

/// Serves `<h1>{id}</h1>` for `pages/{id}.html`, or fails on request.
#[derive(Default)]
pub struct ScriptedContent {
    failing: Mutex<HashSet<String>>,
}

impl ScriptedContent {
    pub fn fail(&self, content_ref: &str) {
        self.failing.lock().insert(content_ref.to_owned());
    }
}

impl ContentSource for ScriptedContent {
    fn fetch(&self, content_ref: &str) -> Result<String, Error> {
        if self.failing.lock().contains(content_ref) {
            return Err(Error::ContentFetchFailed {
                content_ref: content_ref.to_owned(),
                reason: "status 500".into(),
            });
        }
        let id = content_ref
            .trim_start_matches("pages/")
            .trim_end_matches(".html");
        Ok(format!("<h1>{id}</h1>"))
    }
}

/// In-memory store whose writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    broken: AtomicBool,
}

impl FlakyStore {
    pub fn break_writes(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), Error> {
        if self.broken.load(Ordering::SeqCst) {
            Err(Error::PersistenceUnavailable("quota exceeded".into()))
        } else {
            Ok(())
        }
    }
}

impl PersistentStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), Error> {
        self.check()?;
        self.inner.delete(key)
    }
}

/// Wraps a catalog and remembers every search query it answered.
pub struct CountingCatalog {
    inner: Catalog,
    queries: Mutex<Vec<String>>,
}

impl CountingCatalog {
    pub fn new(inner: Catalog) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

impl CatalogSource for CountingCatalog {
    fn get(&self, id: &str) -> Option<Arc<Instrument>> {
        self.inner.get(id)
    }

    fn search(&self, query: &str) -> Vec<Arc<Instrument>> {
        self.queries.lock().push(query.to_owned());
        self.inner.search(query)
    }

    fn by_category(&self, category: &str) -> Vec<Arc<Instrument>> {
        self.inner.by_category(category)
    }
}

pub fn fixture_catalog() -> Arc<Catalog> {
    let items = vec![
        instrument("aapl", "Apple Inc.", "AAPL", "Stocks"),
        instrument("msft", "Microsoft Corporation", "MSFT", "Stocks"),
        Instrument {
            is_template: true,
            ..instrument("amzn", "Amazon.com Inc.", "AMZN", "Stocks")
        },
        instrument("vanguard-500", "Vanguard 500 Index Fund", "VFIAX", "Mutual Funds"),
    ];
    match Catalog::new(items) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => panic!("fixture catalog: {err}"),
    }
}

pub struct Fixture {
    pub router: Router,
    pub view: SharedView,
    pub content: Arc<ScriptedContent>,
    pub store: Arc<FlakyStore>,
    pub catalog: Arc<Catalog>,
}

pub fn fixture() -> Fixture {
    fixture_at(DEFAULT_LOCATION)
}

pub fn fixture_at(location: &str) -> Fixture {
    build_fixture(location, RouterOptions::default())
}

pub fn fixture_with(options: RouterOptions) -> Fixture {
    build_fixture(DEFAULT_LOCATION, options)
}

fn build_fixture(location: &str, options: RouterOptions) -> Fixture {
    let catalog = fixture_catalog();
    let content = Arc::new(ScriptedContent::default());
    let store = Arc::new(FlakyStore::default());
    let mut router = Router::new(
        catalog.clone(),
        content.clone(),
        store.clone(),
        parse(location),
        options,
    );
    let view = SharedView::default();
    router.attach_content(Box::new(view.clone()));
    router.attach_loading_indicator(Box::new(view.clone()));
    Fixture {
        router,
        view,
        content,
        store,
        catalog,
    }
}

/// A router over the fixture catalog with no render targets attached.
pub fn router_with_store(store: Arc<FlakyStore>, location: &str) -> Router {
    Router::new(
        fixture_catalog(),
        Arc::new(ScriptedContent::default()),
        store,
        parse(location),
        RouterOptions::default(),
    )
}

fn parse(location: &str) -> Url {
    match Url::parse(location) {
        Ok(url) => url,
        Err(err) => panic!("bad fixture location {location:?}: {err}"),
    }
}

use std::{fmt, sync::Arc};

use url::Url;

use crate::{
    catalog::{CatalogSource, Instrument},
    content::ContentSource,
    error::Error,
    history::{History, PageTarget},
    markup::{error_panel_html, template_banner_html},
    promise::{Promise, PromiseState},
    recent::{RecentEntry, RecentList, DEFAULT_MAX_RECENT_ITEMS},
    slug::section_anchor,
    store::PersistentStore,
    view::{ContentArea, LoadingIndicator},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    pub push_history: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { push_history: true }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RouterOptions {
    pub max_recent_items: usize,
    /// Drop fetch results that belong to a superseded load instead of
    /// letting the last one to arrive win.
    pub discard_stale_responses: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_recent_items: DEFAULT_MAX_RECENT_ITEMS,
            discard_stale_responses: false,
        }
    }
}

/// A content fetch issued by `Router::load_page`, to be run off the event
/// thread and handed back through `Router::complete_load`.
pub struct PageRequest {
    pub instrument: Arc<Instrument>,
    pub section: Option<String>,
    pub options: LoadOptions,
    generation: u64,
    source: Arc<dyn ContentSource>,
}

impl PageRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetch(self) -> PageResponse {
        let result = self.source.fetch(&self.instrument.content_ref);
        PageResponse {
            request: self,
            result,
        }
    }
}

impl fmt::Debug for PageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRequest")
            .field("instrument", &self.instrument.id)
            .field("section", &self.section)
            .field("options", &self.options)
            .field("generation", &self.generation)
            .finish()
    }
}

#[derive(Debug)]
pub struct PageResponse {
    pub request: PageRequest,
    pub result: Result<String, Error>,
}

#[derive(Clone, Debug, Default)]
pub struct NavigationState {
    pub current_instrument: Option<Arc<Instrument>>,
    pub overlay_open: bool,
    pub last_section: Option<String>,
}

/// Loading state of the content area: deferred on the generation of the
/// newest request, resolved with the shown instrument, rejected with the
/// failure reason.
pub type PageState = Promise<Arc<Instrument>, u64, String>;

pub struct Router {
    catalog: Arc<dyn CatalogSource>,
    source: Arc<dyn ContentSource>,
    store: Arc<dyn PersistentStore>,
    options: RouterOptions,
    history: History,
    recent: RecentList,
    nav: NavigationState,
    page: PageState,
    generation: u64,
    content: Option<Box<dyn ContentArea>>,
    loading: Option<Box<dyn LoadingIndicator>>,
}

impl Router {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        source: Arc<dyn ContentSource>,
        store: Arc<dyn PersistentStore>,
        location: Url,
        options: RouterOptions,
    ) -> Self {
        let recent = RecentList::load(store.as_ref(), options.max_recent_items);
        Self {
            catalog,
            source,
            store,
            options,
            history: History::new(location),
            recent,
            nav: NavigationState::default(),
            page: PageState::default(),
            generation: 0,
            content: None,
            loading: None,
        }
    }

    pub fn attach_content(&mut self, content: Box<dyn ContentArea>) {
        self.content.replace(content);
    }

    pub fn attach_loading_indicator(&mut self, loading: Box<dyn LoadingIndicator>) {
        self.loading.replace(loading);
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogSource> {
        &self.catalog
    }

    pub fn current_instrument(&self) -> Option<&Arc<Instrument>> {
        self.nav.current_instrument.as_ref()
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn set_overlay_open(&mut self, open: bool) {
        self.nav.overlay_open = open;
    }

    pub fn recent(&self) -> &RecentList {
        &self.recent
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn location(&self) -> &Url {
        self.history.current()
    }

    pub fn page_state(&self) -> PromiseState {
        self.page.state()
    }

    pub fn is_loading(&self) -> bool {
        self.page.deferred().is_some()
    }
}

impl Router {
    /// Starts loading `instrument`. Returns the fetch to perform, or `None`
    /// when no content area is attached.
    pub fn load_page(
        &mut self,
        instrument: Arc<Instrument>,
        section: Option<String>,
        options: LoadOptions,
    ) -> Option<PageRequest> {
        if self.content.is_none() {
            log::warn!("no content area attached, not loading {}", instrument.id);
            return None;
        }
        self.generation += 1;
        self.page.defer(self.generation);
        self.set_loading(true);
        log::info!(
            "loading {} (section: {:?}, push: {})",
            instrument.id,
            section,
            options.push_history
        );
        Some(PageRequest {
            instrument,
            section,
            options,
            generation: self.generation,
            source: self.source.clone(),
        })
    }

    /// Applies a finished fetch. Returns `false` if the response was dropped
    /// as stale.
    pub fn complete_load(&mut self, response: PageResponse) -> bool {
        let PageResponse { request, result } = response;
        if self.options.discard_stale_responses && request.generation != self.generation {
            log::debug!(
                "dropping stale response for {} (generation {}, latest {})",
                request.instrument.id,
                request.generation,
                self.generation
            );
            return false;
        }
        match result {
            Ok(html) => self.show_page(request, html),
            Err(err) => self.show_error(request, err),
        }
        self.set_loading(false);
        true
    }

    pub fn navigate_to(&mut self, id: &str, section: Option<String>) -> Option<PageRequest> {
        match self.catalog.get(id) {
            Some(instrument) => self.load_page(instrument, section, LoadOptions::default()),
            None => {
                log::debug!("{}", Error::UnknownInstrumentId(id.to_owned()));
                None
            }
        }
    }

    pub fn check_url_params(&mut self, push_history: bool) -> Option<PageRequest> {
        let target = PageTarget::from_url(self.history.current())?;
        match self.catalog.get(&target.item) {
            Some(instrument) => {
                self.load_page(instrument, target.section, LoadOptions { push_history })
            }
            None => {
                log::debug!("{}", Error::UnknownInstrumentId(target.item));
                None
            }
        }
    }

    /// Steps back in history and restores the page it points at.
    pub fn back(&mut self) -> Option<PageRequest> {
        if self.history.back() {
            self.check_url_params(false)
        } else {
            None
        }
    }

    pub fn forward(&mut self) -> Option<PageRequest> {
        if self.history.forward() {
            self.check_url_params(false)
        } else {
            None
        }
    }

    pub fn record_visit(&mut self, instrument: &Instrument) {
        self.recent.record(RecentEntry::from(instrument));
        if let Err(err) = self.recent.persist(self.store.as_ref()) {
            log::warn!("could not save recent items: {}", err);
        }
    }

    fn show_page(&mut self, request: PageRequest, html: String) {
        let PageRequest {
            instrument,
            section,
            options,
            ..
        } = request;

        let html = if instrument.is_template {
            format!("{}{}", template_banner_html(&instrument), html)
        } else {
            html
        };
        if let Some(content) = &mut self.content {
            content.set_html(&html);
        }

        self.record_visit(&instrument);
        if options.push_history {
            let target = PageTarget {
                item: instrument.id.clone(),
                section: section.clone(),
            };
            let url = target.apply_to(self.history.current());
            self.history.push(url);
        }

        if let Some(content) = &mut self.content {
            match &section {
                Some(label) => {
                    let anchor = section_anchor(label);
                    if !content.scroll_to_anchor(&anchor) {
                        log::debug!("no anchor #{} in {}", anchor, instrument.id);
                    }
                }
                None => content.scroll_to_top(),
            }
        }

        self.nav.last_section = section;
        self.nav.current_instrument = Some(instrument.clone());
        self.page.resolve(instrument);
    }

    fn show_error(&mut self, request: PageRequest, err: Error) {
        log::error!("error loading {}: {}", request.instrument.id, err);
        if let Some(content) = &mut self.content {
            content.set_html(error_panel_html());
        }
        self.page.reject(err.to_string());
    }

    fn set_loading(&mut self, visible: bool) {
        if let Some(loading) = &mut self.loading {
            loading.set_visible(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, Fixture};

    fn open(router: &mut Router, id: &str, section: Option<&str>) {
        let request = router
            .navigate_to(id, section.map(str::to_owned))
            .expect("known instrument");
        router.complete_load(request.fetch());
    }

    #[test]
    fn successful_load_updates_content_url_and_recent() {
        let Fixture {
            mut router, view, ..
        } = fixture();
        let request = router.navigate_to("aapl", None).unwrap();
        assert!(router.is_loading());
        assert_eq!(view.borrow().loading, vec![true]);

        assert!(router.complete_load(request.fetch()));
        let view = view.borrow();
        assert_eq!(view.html, "<h1>aapl</h1>");
        assert_eq!(view.loading, vec![true, false]);
        assert_eq!(view.scrolled_to_top, 1);
        assert_eq!(router.current_instrument().unwrap().id, "aapl");
        assert_eq!(router.recent().ids(), ["aapl"]);
        assert_eq!(router.history().len(), 2);
        assert_eq!(
            router.location().as_str(),
            "http://localhost/index.html?item=aapl"
        );
        assert_eq!(router.page_state(), PromiseState::Resolved);
    }

    #[test]
    fn section_is_written_to_url_and_scrolled_to() {
        let Fixture {
            mut router, view, ..
        } = fixture();
        open(&mut router, "vanguard-500", Some("Fees & Expenses"));
        assert_eq!(view.borrow().anchors, ["fees-and-expenses"]);
        assert_eq!(
            PageTarget::from_url(router.location()).unwrap().section.as_deref(),
            Some("Fees & Expenses")
        );
        assert_eq!(
            router.navigation().last_section.as_deref(),
            Some("Fees & Expenses")
        );

        open(&mut router, "vanguard-500", None);
        assert_eq!(PageTarget::from_url(router.location()).unwrap().section, None);
    }

    #[test]
    fn failed_load_shows_error_and_keeps_state() {
        let Fixture {
            mut router,
            view,
            content,
            ..
        } = fixture();
        open(&mut router, "aapl", None);
        content.fail("pages/msft.html");

        open(&mut router, "msft", None);
        let view = view.borrow();
        assert!(view.html.contains("Error Loading Page"));
        assert_eq!(view.loading.last(), Some(&false));
        assert_eq!(router.current_instrument().unwrap().id, "aapl");
        assert_eq!(router.recent().ids(), ["aapl"]);
        assert_eq!(router.history().len(), 2);
        assert_eq!(router.page_state(), PromiseState::Rejected);
    }

    #[test]
    fn unknown_id_changes_nothing() {
        let Fixture {
            mut router, view, ..
        } = fixture();
        open(&mut router, "aapl", None);
        let before = view.borrow().clone();
        let location = router.location().clone();

        assert!(router.navigate_to("does-not-exist", None).is_none());
        assert_eq!(router.current_instrument().unwrap().id, "aapl");
        assert_eq!(router.location(), &location);
        assert_eq!(*view.borrow(), before);
    }

    #[test]
    fn revisits_keep_recent_list_unique() {
        let Fixture { mut router, .. } = fixture();
        open(&mut router, "aapl", None);
        open(&mut router, "msft", None);
        open(&mut router, "aapl", None);
        assert_eq!(router.recent().ids(), ["aapl", "msft"]);
    }

    #[test]
    fn recent_items_survive_a_restart() {
        let Fixture {
            mut router, store, ..
        } = fixture();
        open(&mut router, "aapl", None);
        open(&mut router, "msft", None);

        let restarted = crate::testing::router_with_store(store, "http://localhost/");
        assert_eq!(restarted.recent().ids(), ["msft", "aapl"]);
    }

    #[test]
    fn persistence_failures_are_not_fatal() {
        let Fixture {
            mut router, store, ..
        } = fixture();
        store.break_writes();
        open(&mut router, "aapl", None);
        assert_eq!(router.recent().ids(), ["aapl"]);
        assert_eq!(router.current_instrument().unwrap().id, "aapl");
    }

    #[test]
    fn checking_url_params_twice_is_idempotent() {
        let Fixture {
            mut router, view, ..
        } =
            crate::testing::fixture_at("http://localhost/index.html?item=msft&section=Charts");
        for _ in 0..2 {
            let request = router.check_url_params(false).unwrap();
            router.complete_load(request.fetch());
        }
        let view = view.borrow();
        assert_eq!(view.html, "<h1>msft</h1>");
        assert_eq!(view.anchors, ["charts", "charts"]);
        assert_eq!(router.history().len(), 1);
        assert_eq!(router.current_instrument().unwrap().id, "msft");
    }

    #[test]
    fn back_and_forward_restore_without_pushing() {
        let Fixture { mut router, .. } = fixture();
        open(&mut router, "aapl", None);
        open(&mut router, "msft", Some("Charts"));
        assert_eq!(router.history().len(), 3);

        let request = router.back().unwrap();
        assert!(!request.options.push_history);
        router.complete_load(request.fetch());
        assert_eq!(router.current_instrument().unwrap().id, "aapl");

        let request = router.forward().unwrap();
        assert_eq!(request.section.as_deref(), Some("Charts"));
        router.complete_load(request.fetch());
        assert_eq!(router.current_instrument().unwrap().id, "msft");
        assert_eq!(router.history().len(), 3);

        router.back();
        router.back();
        assert!(router.back().is_none());
    }

    #[test]
    fn template_pages_get_a_banner() {
        let Fixture {
            mut router, view, ..
        } = fixture();
        open(&mut router, "amzn", None);
        assert!(view.borrow().html.starts_with(r#"<div class="demo-banner">"#));
    }

    #[test]
    fn last_response_to_arrive_wins_by_default() {
        let Fixture {
            mut router, view, ..
        } = fixture();
        let first = router.navigate_to("aapl", None).unwrap();
        let second = router.navigate_to("msft", None).unwrap();

        router.complete_load(second.fetch());
        router.complete_load(first.fetch());
        assert_eq!(router.current_instrument().unwrap().id, "aapl");
        assert_eq!(view.borrow().html, "<h1>aapl</h1>");
    }

    #[test]
    fn stale_responses_can_be_discarded() {
        let Fixture {
            mut router, view, ..
        } = crate::testing::fixture_with(RouterOptions {
            discard_stale_responses: true,
            ..RouterOptions::default()
        });
        let first = router.navigate_to("aapl", None).unwrap();
        let second = router.navigate_to("msft", None).unwrap();

        assert!(router.complete_load(second.fetch()));
        assert!(!router.complete_load(first.fetch()));
        assert_eq!(router.current_instrument().unwrap().id, "msft");
        assert_eq!(router.recent().ids(), ["msft"]);
        assert_eq!(view.borrow().html, "<h1>msft</h1>");
    }

    #[test]
    fn missing_content_area_makes_loading_a_no_op() {
        let mut router = crate::testing::router_with_store(
            Arc::new(crate::testing::FlakyStore::default()),
            "http://localhost/?item=aapl",
        );
        assert!(router.check_url_params(false).is_none());
        assert_eq!(router.page_state(), PromiseState::Empty);
    }
}

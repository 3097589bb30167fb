use std::{
    fmt,
    sync::Arc,
    time::Instant,
};

use crossbeam_channel::Sender;
use threadpool::ThreadPool;
use url::Url;

use crate::{
    actor::{Act, Actor},
    catalog::CatalogSource,
    config::Config,
    content::ContentSource,
    error::Error,
    overlay::NavigationOverlay,
    router::{PageRequest, PageResponse, Router},
    search::{Key, SearchController},
    store::PersistentStore,
};

/// Semantic user actions and internal completions, as seen by the core.
pub enum Event {
    SearchInput(String),
    SearchFocused,
    Key(Key),
    ResultActivated(String),
    ViewAllActivated,
    OutsideClick,
    SidebarActivated(String),
    OverlayRequested(String),
    QuickLink(String),
    SectionActivated(String),
    OverlayClosed,
    Back,
    Forward,
    PageLoaded(PageResponse),
    Tick,
    Shutdown,
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SearchInput(query) => write!(f, "SearchInput({query:?})"),
            Self::Key(key) => write!(f, "Key({key:?})"),
            Self::ResultActivated(id) => write!(f, "ResultActivated({id})"),
            Self::SidebarActivated(id) => write!(f, "SidebarActivated({id})"),
            Self::OverlayRequested(id) => write!(f, "OverlayRequested({id})"),
            Self::QuickLink(term) => write!(f, "QuickLink({term:?})"),
            Self::SectionActivated(label) => write!(f, "SectionActivated({label:?})"),
            Self::PageLoaded(response) => write!(f, "PageLoaded({:?})", response.request),
            Self::SearchFocused => f.write_str("SearchFocused"),
            Self::ViewAllActivated => f.write_str("ViewAllActivated"),
            Self::OutsideClick => f.write_str("OutsideClick"),
            Self::OverlayClosed => f.write_str("OverlayClosed"),
            Self::Back => f.write_str("Back"),
            Self::Forward => f.write_str("Forward"),
            Self::Tick => f.write_str("Tick"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn CatalogSource + Send + Sync>,
    pub content: Arc<dyn ContentSource>,
    pub store: Arc<dyn PersistentStore>,
}

/// Owns the three components on the event thread and runs content fetches
/// on a worker pool, feeding their results back in as `Event::PageLoaded`.
pub struct App {
    router: Router,
    search: SearchController,
    overlay: NavigationOverlay,
    events: Sender<Event>,
    pool: ThreadPool,
}

impl App {
    pub fn new(
        router: Router,
        search: SearchController,
        overlay: NavigationOverlay,
        events: Sender<Event>,
        fetch_threads: usize,
    ) -> Self {
        Self {
            router,
            search,
            overlay,
            events,
            pool: ThreadPool::with_name("content_loading".into(), fetch_threads.max(1)),
        }
    }

    pub fn with_config(
        services: Services,
        location: Url,
        config: &Config,
        events: Sender<Event>,
    ) -> Self {
        let catalog: Arc<dyn CatalogSource> = services.catalog;
        let router = Router::new(
            catalog.clone(),
            services.content,
            services.store,
            location,
            config.router_options(),
        );
        let search = SearchController::new(catalog.clone(), config.search_options());
        let overlay = NavigationOverlay::new(catalog);
        Self::new(router, search, overlay, events, config.fetch_threads)
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn search_mut(&mut self) -> &mut SearchController {
        &mut self.search
    }

    pub fn overlay_mut(&mut self) -> &mut NavigationOverlay {
        &mut self.overlay
    }

    /// Restores the page named by the initial location and draws the
    /// sidebar. Call once, after render targets are attached.
    pub fn start(&mut self) {
        self.overlay.update_sidebar(&self.router);
        let request = self.router.check_url_params(false);
        self.dispatch(request);
    }

    fn dispatch(&self, request: Option<PageRequest>) {
        let Some(request) = request else {
            return;
        };
        let events = self.events.clone();
        self.pool.execute(move || {
            let response = request.fetch();
            if events.send(Event::PageLoaded(response)).is_err() {
                log::debug!("event loop gone, dropping page response");
            }
        });
    }

    fn next_act(&self) -> Act<Self> {
        match self.search.deadline() {
            Some(deadline) => Act::WaitUntil {
                deadline,
                timeout_msg: Event::Tick,
            },
            None => Act::Continue,
        }
    }
}

impl Actor for App {
    type Message = Event;
    type Error = Error;

    fn handle(&mut self, event: Event) -> Result<Act<Self>, Self::Error> {
        log::trace!("event: {:?}", event);
        match event {
            Event::SearchInput(query) => {
                self.search
                    .handle_input(&query, Instant::now(), self.router.recent());
            }
            Event::SearchFocused => {
                self.search.handle_focus(self.router.recent());
            }
            Event::Key(key) => {
                let request = self.search.handle_key(key, &mut self.router);
                self.dispatch(request);
                if key == Key::Escape {
                    self.overlay.handle_escape(&mut self.router);
                }
            }
            Event::ResultActivated(id) => {
                let request = self.search.select(&id, &mut self.router);
                self.dispatch(request);
            }
            Event::ViewAllActivated => {
                self.search.open_view_all();
            }
            Event::OutsideClick => {
                self.search.handle_outside_click();
            }
            Event::SidebarActivated(id) => {
                let request = self.router.navigate_to(&id, None);
                self.dispatch(request);
            }
            Event::OverlayRequested(id) => {
                self.overlay.show_by_id(&id, &mut self.router);
            }
            Event::QuickLink(term) => {
                self.overlay.open_quick_link(&term, &mut self.router);
            }
            Event::SectionActivated(label) => {
                let request = self.overlay.select_section(&label, &mut self.router);
                self.dispatch(request);
            }
            Event::OverlayClosed => {
                self.overlay.close(&mut self.router);
            }
            Event::Back => {
                let request = self.router.back();
                self.dispatch(request);
            }
            Event::Forward => {
                let request = self.router.forward();
                self.dispatch(request);
            }
            Event::PageLoaded(response) => {
                if self.router.complete_load(response) {
                    self.overlay.update_sidebar(&self.router);
                }
            }
            Event::Tick => {
                self.search.poll(Instant::now());
            }
            Event::Shutdown => {
                return Ok(Act::Shutdown);
            }
        }
        Ok(self.next_act())
    }
}

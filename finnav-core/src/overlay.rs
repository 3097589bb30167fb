use std::sync::Arc;

use crate::{
    catalog::{CatalogSource, Instrument},
    router::{LoadOptions, PageRequest, Router},
    view::{OverlayPanel, OverlayView, SidebarList, SidebarRow},
};

/// Section picker overlay plus the "recent" sidebar.
pub struct NavigationOverlay {
    catalog: Arc<dyn CatalogSource>,
    item: Option<Arc<Instrument>>,
    panel: Option<Box<dyn OverlayPanel>>,
    sidebar: Option<Box<dyn SidebarList>>,
}

impl NavigationOverlay {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            item: None,
            panel: None,
            sidebar: None,
        }
    }

    pub fn attach_panel(&mut self, panel: Box<dyn OverlayPanel>) {
        self.panel.replace(panel);
    }

    pub fn attach_sidebar(&mut self, sidebar: Box<dyn SidebarList>) {
        self.sidebar.replace(sidebar);
    }

    pub fn item(&self) -> Option<&Arc<Instrument>> {
        self.item.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.panel.as_ref().is_some_and(|p| p.is_visible())
    }

    pub fn show(&mut self, item: Arc<Instrument>, router: &mut Router) {
        let Some(panel) = &mut self.panel else {
            return;
        };
        panel.show(&OverlayView {
            title: item.name.clone(),
            subtitle: format!("{} • {}", item.symbol, item.category),
            sections: item.sections.clone(),
        });
        self.item = Some(item);
        router.set_overlay_open(true);
    }

    pub fn show_by_id(&mut self, id: &str, router: &mut Router) {
        match self.catalog.get(id) {
            Some(item) => self.show(item, router),
            None => log::debug!("no overlay for unknown instrument {}", id),
        }
    }

    pub fn close(&mut self, router: &mut Router) {
        if let Some(panel) = &mut self.panel {
            panel.hide();
        }
        router.set_overlay_open(false);
    }

    /// Escape closes the overlay only while it is open.
    pub fn handle_escape(&mut self, router: &mut Router) {
        if self.is_open() {
            self.close(router);
        }
    }

    pub fn select_section(&mut self, label: &str, router: &mut Router) -> Option<PageRequest> {
        let item = self.item.clone()?;
        if !item.has_section(label) {
            log::debug!("{} has no section {:?}", item.id, label);
            return None;
        }
        self.close(router);
        router.load_page(item, Some(label.to_owned()), LoadOptions::default())
    }

    /// Quick-link tags open the overlay for the first instrument matching
    /// their search term.
    pub fn open_quick_link(&mut self, term: &str, router: &mut Router) {
        match self.catalog.search(term).into_iter().next() {
            Some(item) => self.show(item, router),
            None => log::debug!("quick link {:?} matched nothing", term),
        }
    }

    pub fn update_sidebar(&mut self, router: &Router) {
        let Some(sidebar) = &mut self.sidebar else {
            return;
        };
        let current = router.current_instrument().map(|item| item.id.as_str());
        let rows: Vec<SidebarRow> = router
            .recent()
            .entries()
            .iter()
            .map(|entry| SidebarRow {
                id: entry.id.clone(),
                icon: entry.icon.clone(),
                label: if entry.symbol.is_empty() {
                    entry.name.clone()
                } else {
                    entry.symbol.clone()
                },
                active: current == Some(entry.id.as_str()),
            })
            .collect();
        sidebar.render(&rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, Fixture};

    fn overlay(fixture: &Fixture) -> NavigationOverlay {
        let mut overlay = NavigationOverlay::new(fixture.router.catalog().clone());
        overlay.attach_panel(Box::new(fixture.view.clone()));
        overlay.attach_sidebar(Box::new(fixture.view.clone()));
        overlay
    }

    #[test]
    fn shows_sections_and_tracks_open_flag() {
        let mut fixture = fixture();
        let mut overlay = overlay(&fixture);
        overlay.show_by_id("vanguard-500", &mut fixture.router);

        let shown = fixture.view.borrow().overlay.clone().unwrap();
        assert_eq!(shown.title, "Vanguard 500 Index Fund");
        assert_eq!(shown.subtitle, "VFIAX • Mutual Funds");
        assert!(shown.sections.contains(&"Fees & Expenses".to_string()));
        assert!(fixture.router.navigation().overlay_open);

        overlay.handle_escape(&mut fixture.router);
        assert!(!fixture.view.borrow().overlay_visible);
        assert!(!fixture.router.navigation().overlay_open);
    }

    #[test]
    fn picking_a_section_closes_and_loads() {
        let mut fixture = fixture();
        let mut overlay = overlay(&fixture);
        overlay.show_by_id("vanguard-500", &mut fixture.router);

        assert!(overlay.select_section("Nope", &mut fixture.router).is_none());
        let request = overlay
            .select_section("Fees & Expenses", &mut fixture.router)
            .unwrap();
        assert!(!fixture.view.borrow().overlay_visible);
        assert_eq!(request.section.as_deref(), Some("Fees & Expenses"));

        fixture.router.complete_load(request.fetch());
        assert_eq!(fixture.view.borrow().anchors, ["fees-and-expenses"]);
    }

    #[test]
    fn quick_link_opens_first_match() {
        let mut fixture = fixture();
        let mut overlay = overlay(&fixture);
        overlay.open_quick_link("micro", &mut fixture.router);
        assert_eq!(overlay.item().unwrap().id, "msft");

        overlay.close(&mut fixture.router);
        overlay.open_quick_link("nothing-like-this", &mut fixture.router);
        assert!(!fixture.view.borrow().overlay_visible);
    }

    #[test]
    fn sidebar_marks_current_instrument() {
        let mut fixture = fixture();
        let mut overlay = overlay(&fixture);
        overlay.update_sidebar(&fixture.router);
        assert!(fixture.view.borrow().sidebar.is_empty());

        for id in ["aapl", "msft"] {
            let request = fixture.router.navigate_to(id, None).unwrap();
            fixture.router.complete_load(request.fetch());
        }
        overlay.update_sidebar(&fixture.router);
        let rows = fixture.view.borrow().sidebar.clone();
        assert_eq!(rows.len(), 2);
        assert_eq!((rows[0].label.as_str(), rows[0].active), ("MSFT", true));
        assert_eq!((rows[1].label.as_str(), rows[1].active), ("AAPL", false));
    }
}

//! Render targets that print to stdout.

use finnav_core::{
    find::Span,
    view::{
        ContentArea, Dropdown, LoadingIndicator, OverlayPanel, OverlayView, ResultSurface,
        ResultsPage, SearchInput, SidebarList, SidebarRow, ViewAll,
    },
};

#[derive(Default)]
pub struct Page {
    html: String,
}

impl ContentArea for Page {
    fn set_html(&mut self, html: &str) {
        self.html = html.to_owned();
        println!("--- page ---\n{html}\n------------");
    }

    fn scroll_to_anchor(&mut self, anchor: &str) -> bool {
        let found = self.html.contains(&format!("id=\"{anchor}\""));
        if found {
            println!("(scrolled to #{anchor})");
        }
        found
    }

    fn scroll_to_top(&mut self) {}
}

pub struct Spinner;

impl LoadingIndicator for Spinner {
    fn set_visible(&mut self, visible: bool) {
        if visible {
            println!("loading...");
        }
    }
}

pub struct SearchBox;

impl SearchInput for SearchBox {
    fn clear(&mut self) {
        println!("(search cleared)");
    }
}

#[derive(Default)]
pub struct DropdownPrinter {
    visible: bool,
    rows: usize,
}

impl ResultSurface for DropdownPrinter {
    fn render(&mut self, dropdown: &Dropdown) {
        self.visible = true;
        self.rows = dropdown.rows().len();
        match dropdown {
            Dropdown::NoResults { query } => {
                println!("No results found for \"{query}\"");
            }
            Dropdown::Results { groups, view_all } => {
                let mut index = 0;
                for group in groups {
                    println!("{}", group.heading);
                    for row in &group.rows {
                        println!("  [{index}] {} {}  {}", row.icon, spans(&row.name), row.meta());
                        index += 1;
                    }
                }
                if let Some(view_all) = view_all {
                    println!("  {}", view_all.label());
                }
            }
            Dropdown::Recent { group } => {
                println!("{}", group.heading);
                for (index, row) in group.rows.iter().enumerate() {
                    println!("  [{index}] {} {}  {}", row.icon, spans(&row.name), row.meta());
                }
            }
        }
    }

    fn set_active(&mut self, index: Option<usize>) {
        if let Some(index) = index {
            println!("> [{index}] of {}", self.rows);
        }
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

pub struct ResultsLink;

impl ResultsPage for ResultsLink {
    fn open(&mut self, view_all: &ViewAll) {
        println!("open {}", view_all.href());
    }
}

pub struct Sidebar;

impl SidebarList for Sidebar {
    fn render(&mut self, rows: &[SidebarRow]) {
        if rows.is_empty() {
            println!("recent: (none)");
            return;
        }
        let labels: Vec<String> = rows
            .iter()
            .map(|row| {
                if row.active {
                    format!("*{}*", row.label)
                } else {
                    row.label.clone()
                }
            })
            .collect();
        println!("recent: {}", labels.join(" | "));
    }
}

#[derive(Default)]
pub struct OverlayPrinter {
    visible: bool,
}

impl OverlayPanel for OverlayPrinter {
    fn show(&mut self, overlay: &OverlayView) {
        self.visible = true;
        println!("{}\n{}", overlay.title, overlay.subtitle);
        for section in &overlay.sections {
            println!("  - {section}");
        }
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Matched spans are wrapped in asterisks.
fn spans(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| {
            if span.matched {
                format!("*{}*", span.text)
            } else {
                span.text.clone()
            }
        })
        .collect()
}

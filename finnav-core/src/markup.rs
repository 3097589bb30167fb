//! HTML renderings of the view models, for render layers that work with
//! markup. Every piece of catalog or user text goes through `escape_html`.

use std::fmt::Write;

use crate::{
    catalog::Instrument,
    find::Span,
    slug::section_anchor,
    view::{Dropdown, OverlayView, ResultGroup, ResultRow, SidebarRow},
};

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn spans_html(spans: &[Span]) -> String {
    spans
        .iter()
        .map(|span| {
            if span.matched {
                format!("<strong>{}</strong>", escape_html(&span.text))
            } else {
                escape_html(&span.text)
            }
        })
        .collect()
}

pub fn error_panel_html() -> &'static str {
    r#"<div class="content-page">
    <div class="content-header">
        <h1 class="content-title">Error Loading Page</h1>
        <p class="content-subtitle">The requested page could not be loaded.</p>
    </div>
    <p>Please try again or contact support if the problem persists.</p>
</div>"#
}

pub fn template_banner_html(item: &Instrument) -> String {
    format!(
        r#"<div class="demo-banner">Demo template: this page shows placeholder content, not data for {}.</div>"#,
        escape_html(&item.name)
    )
}

fn row_html(out: &mut String, row: &ResultRow, index: usize) {
    let _ = write!(
        out,
        r#"<div class="search-result-item" data-index="{index}" data-item-id="{id}"><div class="search-result-icon">{icon}</div><div class="search-result-info"><div class="search-result-name">{name}</div><div class="search-result-meta">{meta}</div></div></div>"#,
        id = escape_html(&row.id),
        icon = escape_html(&row.icon),
        name = spans_html(&row.name),
        meta = escape_html(&row.meta()),
    );
}

fn group_html(out: &mut String, group: &ResultGroup, index: &mut usize) {
    let _ = write!(
        out,
        r#"<div class="search-category-header">{}</div>"#,
        escape_html(&group.heading)
    );
    for row in &group.rows {
        row_html(out, row, *index);
        *index += 1;
    }
}

impl Dropdown {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        let mut index = 0;
        match self {
            Self::Results { groups, view_all } => {
                for group in groups {
                    group_html(&mut out, group, &mut index);
                }
                if let Some(view_all) = view_all {
                    let _ = write!(
                        out,
                        r#"<a class="search-view-all" href="{}">{}</a>"#,
                        escape_html(&view_all.href()),
                        escape_html(&view_all.label())
                    );
                }
            }
            Self::NoResults { query } => {
                let _ = write!(
                    out,
                    r#"<div class="search-no-results"><p>No results found for "{}"</p></div>"#,
                    escape_html(query)
                );
            }
            Self::Recent { group } => group_html(&mut out, group, &mut index),
        }
        out
    }
}

pub fn sidebar_html(rows: &[SidebarRow]) -> String {
    if rows.is_empty() {
        return r#"<li class="nav-item empty-state">No recent items</li>"#.to_string();
    }
    rows.iter()
        .map(|row| {
            format!(
                r##"<li class="nav-item"><a href="#" data-item-id="{}" class="{}"><span class="icon">{}</span>{}</a></li>"##,
                escape_html(&row.id),
                if row.active { "active" } else { "" },
                escape_html(&row.icon),
                escape_html(&row.label)
            )
        })
        .collect()
}

impl OverlayView {
    pub fn nav_html(&self) -> String {
        self.sections
            .iter()
            .map(|section| {
                format!(
                    r##"<li class="overlay-nav-item"><a href="#{}" data-section="{}">{}</a></li>"##,
                    section_anchor(section),
                    escape_html(section),
                    escape_html(section)
                )
            })
            .collect()
    }
}

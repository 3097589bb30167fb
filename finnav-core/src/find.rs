use regex::{Regex, RegexBuilder};

/// A piece of displayed text, flagged when it matched the search query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub matched: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            matched: false,
        }
    }

    pub fn matched(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            matched: true,
        }
    }
}

/// Case-insensitive literal matcher for highlighting query occurrences.
#[derive(Clone)]
pub struct FindQuery {
    regex: Option<Regex>,
}

impl FindQuery {
    pub fn new(query: &str) -> Self {
        Self {
            regex: Self::build_regex(query),
        }
    }

    fn build_regex(query: &str) -> Option<Regex> {
        if query.is_empty() {
            return None;
        }
        // The query is a literal; escape it so `(`, `.`, `+` and friends
        // don't turn into pattern syntax.
        RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
            .map_err(|err| log::warn!("cannot highlight {:?}: {}", query, err))
            .ok()
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    pub fn matches_str(&self, s: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(s))
    }

    pub fn highlight(&self, text: &str) -> Vec<Span> {
        let Some(regex) = &self.regex else {
            return vec![Span::plain(text)];
        };
        let mut spans = Vec::new();
        let mut last = 0;
        for m in regex.find_iter(text) {
            if m.start() > last {
                spans.push(Span::plain(&text[last..m.start()]));
            }
            spans.push(Span::matched(m.as_str()));
            last = m.end();
        }
        if last < text.len() || spans.is_empty() {
            spans.push(Span::plain(&text[last..]));
        }
        spans
    }
}

use url::Url;

pub const ITEM_PARAM: &str = "item";
pub const SECTION_PARAM: &str = "section";

/// What the `item` and `section` query parameters of a location point at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageTarget {
    pub item: String,
    pub section: Option<String>,
}

impl PageTarget {
    pub fn from_url(url: &Url) -> Option<Self> {
        let item = query_param(url, ITEM_PARAM)?;
        Some(Self {
            item,
            section: query_param(url, SECTION_PARAM),
        })
    }

    /// `url` with `item` set and `section` set or removed. Unrelated
    /// parameters are kept in place.
    pub fn apply_to(&self, url: &Url) -> Url {
        let mut item = Some(&self.item);
        let mut section = self.section.as_ref();
        let mut pairs: Vec<(String, String)> = Vec::new();
        // An existing parameter keeps its position; repeats of it are dropped.
        for (key, value) in url.query_pairs() {
            let replacement = if key == ITEM_PARAM {
                item.take()
            } else if key == SECTION_PARAM {
                section.take()
            } else {
                pairs.push((key.into_owned(), value.into_owned()));
                continue;
            };
            if let Some(replacement) = replacement {
                pairs.push((key.into_owned(), replacement.clone()));
            }
        }
        if let Some(item) = item {
            pairs.push((ITEM_PARAM.to_owned(), item.clone()));
        }
        if let Some(section) = section {
            pairs.push((SECTION_PARAM.to_owned(), section.clone()));
        }
        let mut url = url.clone();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url
    }
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

/// Session history: a list of locations with a cursor.
#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<Url>,
    position: usize,
}

impl History {
    pub fn new(initial: Url) -> Self {
        Self {
            entries: vec![initial],
            position: 0,
        }
    }

    pub fn current(&self) -> &Url {
        &self.entries[self.position]
    }

    /// Adds an entry after the current one, dropping any forward entries.
    pub fn push(&mut self, url: Url) {
        self.entries.truncate(self.position + 1);
        self.entries.push(url);
        self.position += 1;
    }

    pub fn back(&mut self) -> bool {
        if self.position > 0 {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    pub fn forward(&mut self) -> bool {
        if self.position + 1 < self.entries.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

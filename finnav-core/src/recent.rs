use serde::{Deserialize, Serialize};

use crate::{catalog::Instrument, error::Error, store::PersistentStore};

pub const RECENT_ITEMS_KEY: &str = "recentItems";
pub const DEFAULT_MAX_RECENT_ITEMS: usize = 5;

/// Display snapshot of an instrument taken when it was visited.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecentEntry {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub icon: String,
    #[serde(default)]
    pub category: String,
}

impl From<&Instrument> for RecentEntry {
    fn from(item: &Instrument) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            symbol: item.symbol.clone(),
            icon: item.icon.clone(),
            category: item.category.clone(),
        }
    }
}

/// Most-recently-visited first, unique by id, bounded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentList {
    entries: Vec<RecentEntry>,
    max_len: usize,
}

impl RecentList {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_len,
        }
    }

    /// Reads the persisted list. Anything unusable in the store yields an
    /// empty list.
    pub fn load(store: &dyn PersistentStore, max_len: usize) -> Self {
        let mut list = Self::new(max_len);
        match Self::read(store) {
            Ok(entries) => {
                for entry in entries {
                    if list.entries.len() == max_len {
                        break;
                    }
                    if !list.contains(&entry.id) {
                        list.entries.push(entry);
                    }
                }
            }
            Err(err) => {
                log::warn!("could not load recent items: {}", err);
            }
        }
        list
    }

    fn read(store: &dyn PersistentStore) -> Result<Vec<RecentEntry>, Error> {
        match store.get(RECENT_ITEMS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn persist(&self, store: &dyn PersistentStore) -> Result<(), Error> {
        let json = serde_json::to_string(&self.entries)?;
        store.set(RECENT_ITEMS_KEY, &json)
    }

    pub fn record(&mut self, entry: RecentEntry) {
        self.entries.retain(|e| e.id != entry.id);
        self.entries.insert(0, entry);
        self.entries.truncate(self.max_len);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RecentList {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECENT_ITEMS)
    }
}

use std::{collections::HashSet, fs::File, io::Read, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::Error;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub category: String,
    pub icon: String,
    #[serde(default)]
    pub description: String,
    pub content_ref: String,
    pub sections: Vec<String>,
    #[serde(default)]
    pub is_template: bool,
}

impl Instrument {
    pub fn has_section(&self, label: &str) -> bool {
        self.sections.iter().any(|s| s == label)
    }

    /// Case-insensitive substring match against name, symbol, category and
    /// description. `needle` must already be lowercase.
    fn matches_lowercase(&self, needle: &str) -> bool {
        [
            &self.name,
            &self.symbol,
            &self.category,
            &self.description,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

pub trait CatalogSource {
    fn get(&self, id: &str) -> Option<Arc<Instrument>>;

    /// Instruments matching `query`, in catalog order. Blank queries match
    /// nothing.
    fn search(&self, query: &str) -> Vec<Arc<Instrument>>;

    fn by_category(&self, category: &str) -> Vec<Arc<Instrument>>;
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<Arc<Instrument>>,
}

impl Catalog {
    pub fn new(items: Vec<Instrument>) -> Result<Self, Error> {
        let mut ids = HashSet::new();
        for item in &items {
            if !ids.insert(item.id.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate instrument id {:?}",
                    item.id
                )));
            }
            if item.sections.is_empty() {
                return Err(Error::InvalidCatalog(format!(
                    "instrument {:?} has no sections",
                    item.id
                )));
            }
            let mut labels = HashSet::new();
            if let Some(dup) = item.sections.iter().find(|s| !labels.insert(s.as_str())) {
                return Err(Error::InvalidCatalog(format!(
                    "instrument {:?} repeats section {:?}",
                    item.id, dup
                )));
            }
        }
        Ok(Self {
            items: items.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        log::info!("loading catalog: {:?}", path);
        let mut json = String::new();
        File::open(path)?.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    pub fn builtin() -> Result<Self, Error> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Instrument>> {
        self.items.iter()
    }
}

impl CatalogSource for Catalog {
    fn get(&self, id: &str) -> Option<Arc<Instrument>> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    fn search(&self, query: &str) -> Vec<Arc<Instrument>> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    fn by_category(&self, category: &str) -> Vec<Arc<Instrument>> {
        let category = category.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.category.to_lowercase() == category)
            .cloned()
            .collect()
    }
}

//! Grouped item catalog and its deterministic flattening.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type ItemId = i64;

/// One tracked item. Also accepts the legacy `productId` / `productName` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(alias = "productId")]
    pub item_id: ItemId,

    #[serde(alias = "productName")]
    pub item_name: String,

    pub unit_price: f64,

    #[serde(default)]
    pub base_price: Option<f64>,

    #[serde(default)]
    pub max_quantity: Option<u32>,
}

/// Catalog keyed by group label (e.g. category name).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: HashMap<String, Vec<CatalogItem>>,
}

impl Catalog {
    pub fn new(groups: HashMap<String, Vec<CatalogItem>>) -> Self {
        Self { groups }
    }

    pub fn insert_group(&mut self, name: impl Into<String>, items: Vec<CatalogItem>) {
        self.groups.insert(name.into(), items);
    }

    pub fn groups(&self) -> &HashMap<String, Vec<CatalogItem>> {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Group names in lexicographic order, each group's items by id, concatenated.
    ///
    /// The result depends only on the catalog's contents, never on insertion
    /// or arrival order, so a cursor into it stays meaningful across refreshes.
    pub fn flatten(&self) -> Vec<CatalogItem> {
        let mut names: Vec<&String> = self.groups.keys().collect();
        names.sort();

        names
            .into_iter()
            .flat_map(|name| {
                let mut items = self.groups[name].clone();
                items.sort_by_key(|i| i.item_id);
                items
            })
            .collect()
    }
}

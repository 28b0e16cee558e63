use std::path::Path;
use std::sync::Arc;

use rotation::Catalog;
use tokio::sync::RwLock;

use crate::error::AppError;

/// In-memory catalog shared between the host and the rotation loop.
/// The host may replace it at any time; the rotation reads a fresh copy each tick.
#[derive(Clone, Default)]
pub struct CatalogStore {
    inner: Arc<RwLock<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(catalog)),
        }
    }

    /// Replace the whole catalog. Last write wins.
    pub async fn set(&self, catalog: Catalog) {
        let mut g = self.inner.write().await;
        *g = catalog;
    }

    pub async fn get(&self) -> Catalog {
        let g = self.inner.read().await;
        g.clone()
    }
}

/// Reads a `{ "<group>": [item, ...] }` JSON file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, AppError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let raw = std::fs::read_to_string(path).map_err(|source| AppError::CatalogIo {
        path: display.clone(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| AppError::CatalogDecode {
        path: display,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rotation::CatalogItem;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn item(id: i64) -> CatalogItem {
        CatalogItem {
            item_id: id,
            item_name: format!("item-{id}"),
            unit_price: 1.0,
            base_price: None,
            max_quantity: None,
        }
    }

    #[tokio::test]
    async fn set_replaces_the_catalog() {
        let store = CatalogStore::default();
        assert!(store.get().await.is_empty());

        let mut next = Catalog::default();
        next.insert_group("Snacks", vec![item(1)]);
        store.set(next).await;

        let flat = store.get().await.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].item_id, 1);
    }

    #[test]
    fn load_catalog_reads_aliased_fields() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"Beverages":[{{"productId":2,"productName":"Cola","unitPrice":2.5}}]}}"#
        )
        .unwrap();

        let catalog = load_catalog(f.path()).unwrap();
        let flat = catalog.flatten();
        assert_eq!(flat[0].item_id, 2);
        assert_eq!(flat[0].item_name, "Cola");
    }

    #[test]
    fn load_catalog_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            load_catalog(dir.path().join("missing.json")),
            Err(AppError::CatalogIo { .. })
        ));

        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(AppError::CatalogDecode { .. })
        ));
    }
}

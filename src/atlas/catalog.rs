//! # Product Catalog
//!
//! The list of Atlas products, loaded once at startup and passed around in
//! the application context. A local JSON copy is preferred; when it is
//! missing the catalog is fetched from the API and written back for next time.

use std::fs;
use std::io;
use std::path::Path;

use log::{debug, info, warn};

use super::client::{AtlasClient, AtlasError};
use super::types::AmbaProduct;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    products: Vec<AmbaProduct>,
}

impl ProductCatalog {
    pub fn new(products: Vec<AmbaProduct>) -> Self {
        Self { products }
    }

    /// Reads a catalog previously saved as a JSON array of products.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let products: Vec<AmbaProduct> =
            serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self { products })
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.products)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// Local file first, then the API. Fetched catalogs are cached to `path`.
    pub async fn load(path: &Path, client: &AtlasClient) -> Result<Self, AtlasError> {
        match Self::from_file(path) {
            Ok(catalog) => {
                info!("Loaded {} products from {}", catalog.len(), path.display());
                return Ok(catalog);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No product catalog at {}, fetching from API", path.display());
            }
            Err(e) => {
                warn!("Ignoring unreadable product catalog {}: {}", path.display(), e);
            }
        }

        let catalog = Self::new(client.products().await?);
        if let Err(e) = catalog.save(path) {
            warn!("Failed to cache product catalog to {}: {}", path.display(), e);
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn get(&self, product_id: i64) -> Option<&AmbaProduct> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Brain atlas products, sorted by id.
    pub fn brain_atlas_products(&self) -> Vec<&AmbaProduct> {
        let mut products: Vec<&AmbaProduct> =
            self.products.iter().filter(|p| p.is_brain_atlas()).collect();
        products.sort_by_key(|p| p.id);
        products
    }
}

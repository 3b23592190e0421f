//! # Record Store
//!
//! Flat JSON documents on disk.
//!
//! Core purpose is to hold the products and sales collections between restarts. Every operation
//! loads the whole document, changes it in memory and writes the whole document back.
//!
//! ## Layout
//!
//! - `{data_dir}/products.json`: `{ "products": [...] }`
//! - `{data_dir}/sales.json`: `{ "sales": [...] }`
//!
//! ## Implementation
//!
//! - A missing or corrupt document reads as the empty collection, never as an error
//! - Sales are rewritten from their raw JSON, so records the typed view reads leniently are
//!   written back exactly as they were found
//! - A sale record that is not even an object is left out of reads and kept on disk
//! - One async mutex per document serializes read-modify-write cycles inside the process
//! - Writes land in a sibling `.tmp` file first and are renamed over the document
//! - Pretty printed with 2 space indentation so the files stay hand editable
//!
//! Writers in other processes are not coordinated with.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};
use trends::{Product, ProductsCollection, Sale, SalesCollection};

use crate::error::AppError;

pub const PRODUCTS_FILE: &str = "products.json";
pub const SALES_FILE: &str = "sales.json";

/// The sales document exactly as stored.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSales {
    #[serde(default)]
    sales: Vec<Value>,
}

pub struct JsonStore {
    data_dir: PathBuf,
    products_lock: Mutex<()>,
    sales_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            products_lock: Mutex::new(()),
            sales_lock: Mutex::new(()),
        }
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(PRODUCTS_FILE)
    }

    pub fn sales_path(&self) -> PathBuf {
        self.data_dir.join(SALES_FILE)
    }

    pub async fn load_products(&self) -> ProductsCollection {
        read_document(&self.products_path()).await
    }

    pub async fn load_sales(&self) -> SalesCollection {
        let stored: StoredSales = read_document(&self.sales_path()).await;

        let sales = stored
            .sales
            .into_iter()
            .filter_map(|raw| {
                serde_json::from_value(raw)
                    .map_err(|e| warn!("Unreadable sale record: {e}"))
                    .ok()
            })
            .collect();

        SalesCollection { sales }
    }

    pub async fn append_product(&self, product: Product) -> Result<Product, AppError> {
        let _guard = self.products_lock.lock().await;

        let mut document = self.load_products().await;
        document.products.push(product.clone());
        write_document(&self.products_path(), &document).await?;

        info!("Product added, {} stored", document.products.len());
        Ok(product)
    }

    pub async fn append_sale(&self, sale: Sale) -> Result<Sale, AppError> {
        self.append_sales(vec![sale.clone()]).await?;
        Ok(sale)
    }

    /// Appends in one write, returns the new document length.
    pub async fn append_sales(&self, sales: Vec<Sale>) -> Result<usize, AppError> {
        let _guard = self.sales_lock.lock().await;

        let mut document: StoredSales = read_document(&self.sales_path()).await;
        let added = sales.len();
        for sale in sales {
            document.sales.push(serde_json::to_value(sale)?);
        }
        write_document(&self.sales_path(), &document).await?;

        info!("{added} sale(s) added, {} stored", document.sales.len());
        Ok(document.sales.len())
    }

    pub async fn find_product(&self, id: i64) -> Option<Product> {
        self.load_products()
            .await
            .products
            .into_iter()
            .find(|product| product.id() == Some(id))
    }

    /// Shallow merges `patch` into the first product with `id`.
    pub async fn update_product(
        &self,
        id: i64,
        patch: Map<String, Value>,
    ) -> Result<Option<Product>, AppError> {
        let _guard = self.products_lock.lock().await;

        let mut document = self.load_products().await;
        let Some(product) = document
            .products
            .iter_mut()
            .find(|product| product.id() == Some(id))
        else {
            return Ok(None);
        };

        product.merge(patch);
        let updated = product.clone();
        write_document(&self.products_path(), &document).await?;

        info!("Product {id} updated");
        Ok(Some(updated))
    }

    pub async fn delete_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let _guard = self.products_lock.lock().await;

        let mut document = self.load_products().await;
        let Some(index) = document
            .products
            .iter()
            .position(|product| product.id() == Some(id))
        else {
            return Ok(None);
        };

        let removed = document.products.remove(index);
        write_document(&self.products_path(), &document).await?;

        info!("Product {id} deleted");
        Ok(Some(removed))
    }
}

async fn read_document<T: DeserializeOwned + Default>(path: &Path) -> T {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist yet, using empty collection", path.display());
            return T::default();
        }
        Err(e) => {
            warn!("Error loading {}: {e}, using empty collection", path.display());
            return T::default();
        }
    };

    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        warn!("Corrupt document {}: {e}, using empty collection", path.display());
        T::default()
    })
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, serde_json::to_vec_pretty(document)?).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}

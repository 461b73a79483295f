//! Product catalog service.

use chrono::Utc;
use thiserror::Error;

use mercado_core::{Price, ProductId};

use crate::db::{ProductStore, RepositoryError, Stores};
use crate::models::Product;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product not found.
    #[error("product not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Fields for a new product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category: String,
    pub brand: String,
    pub count_in_stock: u32,
}

/// Partial product update; absent fields are left untouched.
#[derive(Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub count_in_stock: Option<u32>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: &'a dyn ProductStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(stores: &'a Stores) -> Self {
        Self {
            products: stores.products.as_ref(),
        }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.find_all().await?)
    }

    /// One product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if absent.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Create a product. Admin only; enforced at the route layer.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the insert fails.
    pub async fn create(&self, fields: NewProduct) -> Result<Product, CatalogError> {
        let product = Product::new(
            fields.name,
            fields.description,
            fields.price,
            fields.image_url,
            fields.category,
            fields.brand,
            fields.count_in_stock,
        );
        self.products.create(&product).await?;
        Ok(product)
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if absent.
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, CatalogError> {
        let mut product = self.get(id).await?;

        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(description) = update.description {
            product.description = description;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(image_url) = update.image_url {
            product.image_url = image_url;
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        if let Some(brand) = update.brand {
            product.brand = brand;
        }
        if let Some(count_in_stock) = update.count_in_stock {
            product.count_in_stock = count_in_stock;
        }
        product.updated_at = Utc::now();

        self.products.save(&product).await?;
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if absent.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        if self.products.delete(id).await? {
            Ok(())
        } else {
            Err(CatalogError::NotFound)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> NewProduct {
        NewProduct {
            name: "Cámara Canon EOS".to_owned(),
            description: "Réflex digital de 24 MP".to_owned(),
            price: Price::from_major(929),
            image_url: "/images/camara.png".to_owned(),
            category: "Electrónica".to_owned(),
            brand: "Canon".to_owned(),
            count_in_stock: 7,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let stores = Stores::memory();
        let catalog = CatalogService::new(&stores);

        let created = catalog.create(sample()).await.unwrap();
        let fetched = catalog.get(created.id).await.unwrap();
        assert_eq!(fetched.name, "Cámara Canon EOS");
        assert_eq!(fetched.count_in_stock, 7);
        assert_eq!(fetched.num_reviews, 0);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let stores = Stores::memory();
        let catalog = CatalogService::new(&stores);
        let created = catalog.create(sample()).await.unwrap();

        let updated = catalog
            .update(
                created.id,
                ProductUpdate {
                    price: Some(Price::from_major(899)),
                    count_in_stock: Some(12),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        // Changed
        assert_eq!(updated.price, Price::from_major(899));
        assert_eq!(updated.count_in_stock, 12);
        // Untouched
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.brand, created.brand);
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let stores = Stores::memory();
        let catalog = CatalogService::new(&stores);
        let created = catalog.create(sample()).await.unwrap();

        catalog.delete(created.id).await.unwrap();
        assert!(matches!(
            catalog.get(created.id).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            catalog.delete(created.id).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list() {
        let stores = Stores::memory();
        let catalog = CatalogService::new(&stores);

        assert!(catalog.list().await.unwrap().is_empty());
        catalog.create(sample()).await.unwrap();
        catalog.create(sample()).await.unwrap();
        assert_eq!(catalog.list().await.unwrap().len(), 2);
    }
}

//! Catalog repository: categories, products and services.
//!
//! All queries are runtime-checked (`query_as`), since the schema is only
//! available after migrations run.

use std::collections::HashMap;

use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

use evergreen_core::CategoryId;

use super::{RepositoryError, map_unique_violation};
use crate::models::catalog::{Category, ProductWithCategory, Service, ServiceWithCategory};

const PRODUCT_WITH_CATEGORY: &str = "\
    SELECT p.*, c.slug AS category_slug
    FROM products p
    JOIN categories c ON c.id = p.category_id";

const SERVICE_WITH_CATEGORY: &str = "\
    SELECT s.*, c.slug AS category_slug
    FROM services s
    LEFT JOIN categories c ON c.id = s.category_id";

/// Fields for a new product row.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub id: String,
    pub category_id: CategoryId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub image_urls: Vec<String>,
    pub characteristics: HashMap<String, String>,
}

/// Partial update for a service; `None` fields stay untouched.
#[derive(Debug, Clone, Default)]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub image_url: Option<String>,
}

/// Repository for catalog reads and admin catalog writes.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All categories in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Look up a category by its (already normalized) slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Number of categories; drives seed idempotence.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_categories(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a category and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn insert_category(
        &self,
        slug: &str,
        title: &str,
        description: &str,
        hero_image: &str,
    ) -> Result<Category, RepositoryError> {
        sqlx::query(
            "INSERT INTO categories (slug, title, description, hero_image) VALUES (?, ?, ?, ?)",
        )
        .bind(slug)
        .bind(title)
        .bind(description)
        .bind(hero_image)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "category"))?;

        self.get_category_by_slug(slug)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Products, most recently created first, optionally filtered by a
    /// normalized category slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let rows = match category_slug {
            Some(slug) => {
                let sql = format!("{PRODUCT_WITH_CATEGORY} WHERE c.slug = ? ORDER BY p.created DESC, p.id");
                sqlx::query_as::<_, ProductWithCategory>(&sql)
                    .bind(slug)
                    .fetch_all(self.pool)
                    .await?
            }
            None => {
                let sql = format!("{PRODUCT_WITH_CATEGORY} ORDER BY p.created DESC, p.id");
                sqlx::query_as::<_, ProductWithCategory>(&sql)
                    .fetch_all(self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Exact-id product lookup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(
        &self,
        id: &str,
    ) -> Result<Option<ProductWithCategory>, RepositoryError> {
        let sql = format!("{PRODUCT_WITH_CATEGORY} WHERE p.id = ?");
        let row = sqlx::query_as::<_, ProductWithCategory>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn insert_product(
        &self,
        new: NewProduct,
    ) -> Result<ProductWithCategory, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_product(&mut conn, new).await
    }

    /// Services ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_services(&self) -> Result<Vec<ServiceWithCategory>, RepositoryError> {
        let sql = format!("{SERVICE_WITH_CATEGORY} ORDER BY s.title");
        let rows = sqlx::query_as::<_, ServiceWithCategory>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Exact-id service lookup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_service(
        &self,
        id: &str,
    ) -> Result<Option<ServiceWithCategory>, RepositoryError> {
        let sql = format!("{SERVICE_WITH_CATEGORY} WHERE s.id = ?");
        let row = sqlx::query_as::<_, ServiceWithCategory>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Insert a service.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken,
    /// `RepositoryError::Database` for other failures.
    pub async fn insert_service(&self, service: &Service) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO services (id, category_id, title, description, price, status, image_url)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&service.id)
        .bind(service.category_id)
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.price)
        .bind(&service.status)
        .bind(&service.image_url)
        .execute(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "service"))?;
        Ok(())
    }

    /// Apply a partial update to a service and return the fresh row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the service does not exist,
    /// `RepositoryError::Database` for other failures.
    pub async fn update_service(
        &self,
        id: &str,
        patch: ServicePatch,
    ) -> Result<ServiceWithCategory, RepositoryError> {
        let current = self
            .get_service(id)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .service;

        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.unwrap_or(current.description);
        let price = patch.price.unwrap_or(current.price);
        let status = patch.status.unwrap_or(current.status);
        let category_id = patch.category_id.unwrap_or(current.category_id);
        let image_url = patch.image_url.unwrap_or(current.image_url);

        sqlx::query(
            "UPDATE services
             SET title = ?, description = ?, price = ?, status = ?,
                 category_id = ?, image_url = ?, updated = datetime('now')
             WHERE id = ?",
        )
        .bind(&title)
        .bind(&description)
        .bind(price)
        .bind(&status)
        .bind(category_id)
        .bind(&image_url)
        .bind(id)
        .execute(self.pool)
        .await?;

        self.get_service(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

// Connection-level helpers shared with the order-placement transaction.

/// Product lookup on an explicit connection (usable inside a transaction).
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_product(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<ProductWithCategory>, RepositoryError> {
    let sql = format!("{PRODUCT_WITH_CATEGORY} WHERE p.id = ?");
    let row = sqlx::query_as::<_, ProductWithCategory>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Service lookup on an explicit connection.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn get_service(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<ServiceWithCategory>, RepositoryError> {
    let sql = format!("{SERVICE_WITH_CATEGORY} WHERE s.id = ?");
    let row = sqlx::query_as::<_, ServiceWithCategory>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Lowest-id category, the materialization fallback for services without one.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn first_category_id(
    conn: &mut SqliteConnection,
) -> Result<Option<CategoryId>, RepositoryError> {
    let id: Option<CategoryId> =
        sqlx::query_scalar("SELECT id FROM categories ORDER BY id LIMIT 1")
            .fetch_optional(conn)
            .await?;
    Ok(id)
}

/// Insert a product on an explicit connection and return it joined with its
/// category slug.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` on a duplicate id,
/// `RepositoryError::Database` for other failures.
pub async fn insert_product(
    conn: &mut SqliteConnection,
    new: NewProduct,
) -> Result<ProductWithCategory, RepositoryError> {
    sqlx::query(
        "INSERT INTO products (id, category_id, title, description, price, image_urls, characteristics)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.id)
    .bind(new.category_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.price)
    .bind(Json(&new.image_urls))
    .bind(Json(&new.characteristics))
    .execute(&mut *conn)
    .await
    .map_err(|e| map_unique_violation(e, "product"))?;

    get_product(conn, &new.id)
        .await?
        .ok_or(RepositoryError::NotFound)
}

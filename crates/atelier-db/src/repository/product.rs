//! # Product Repository
//!
//! Database operations for catalog products (courses, ingredients kits,
//! merchandise).
//!
//! The checkout only reads from here: a product's current name and price
//! are copied into the cart line when it is added, and nothing the catalog
//! does afterwards reaches that line.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                                                               │
//! │                                                                         │
//! │  product_id | product_name       | category | price (satang) | active  │
//! │  ───────────┼────────────────────┼──────────┼────────────────┼──────── │
//! │  1          | Knife Skills 101   | course   | 150000         | 1       │
//! │  2          | Thai Curry Basics  | course   | 180000         | 1       │
//! │  3          | Chef Apron         | merch    | 35000          | 1       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use atelier_core::validation::{validate_name, validate_price, validate_search_query};
use atelier_core::{Money, Product, ProductId};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_PRODUCT: &str = r#"
    SELECT product_id, product_name, category, price, is_active
    FROM products
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let knife = repo.insert("Knife Skills 101", Some("course"), Money::from_baht(1500)).await?;
/// let results = repo.search("knife", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name (case-insensitive substring).
    ///
    /// An empty query lists active products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "{SELECT_PRODUCT} WHERE is_active = 1 AND product_name LIKE ?1 ORDER BY product_name LIMIT ?2"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE is_active = 1 ORDER BY product_name LIMIT ?1");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find(&self, id: ProductId) -> DbResult<Option<Product>> {
        let sql = format!("{SELECT_PRODUCT} WHERE product_id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its ID, failing with `DbError::NotFound`.
    pub async fn get(&self, id: ProductId) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new active product and returns it with its generated id.
    pub async fn insert(
        &self,
        name: &str,
        category: Option<&str>,
        price: Money,
    ) -> DbResult<Product> {
        validate_name("product_name", name)?;
        validate_price("price", price)?;

        debug!(name = %name, price = %price, "Inserting product");

        let result = sqlx::query(
            r#"
            INSERT INTO products (product_name, category, price, is_active)
            VALUES (?1, ?2, ?3, 1)
            "#,
        )
        .bind(name.trim())
        .bind(category)
        .bind(price)
        .execute(&self.pool)
        .await?;

        Ok(Product {
            product_id: result.last_insert_rowid(),
            product_name: name.trim().to_string(),
            category: category.map(str::to_string),
            price,
            is_active: true,
        })
    }

    /// Changes a product's catalog price.
    ///
    /// Open carts and committed bills keep the price they captured.
    pub async fn update_price(&self, id: ProductId, price: Money) -> DbResult<()> {
        validate_price("price", price)?;

        debug!(id = %id, price = %price, "Updating product price");

        let result = sqlx::query("UPDATE products SET price = ?2 WHERE product_id = ?1")
            .bind(id)
            .bind(price)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hides a product from search without touching historical bills.
    pub async fn set_active(&self, id: ProductId, active: bool) -> DbResult<()> {
        debug!(id = %id, active, "Setting product active flag");

        let result = sqlx::query("UPDATE products SET is_active = ?2 WHERE product_id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> ProductRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = repo().await;
        let knife = repo
            .insert("Knife Skills 101", Some("course"), Money::from_baht(1500))
            .await
            .unwrap();

        let loaded = repo.get(knife.product_id).await.unwrap();
        assert_eq!(loaded, knife);
        assert!(matches!(repo.get(999).await, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_input() {
        let repo = repo().await;
        assert!(repo.insert("  ", None, Money::from_baht(1)).await.is_err());
        assert!(repo.insert("Refund", None, Money::from_baht(-1)).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_and_deactivate() {
        let repo = repo().await;
        let knife = repo
            .insert("Knife Skills 101", Some("course"), Money::from_baht(1500))
            .await
            .unwrap();
        repo.insert("Thai Curry Basics", Some("course"), Money::from_baht(1800))
            .await
            .unwrap();

        let found = repo.search("knife", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_name, "Knife Skills 101");

        assert_eq!(repo.search("", 10).await.unwrap().len(), 2);

        repo.set_active(knife.product_id, false).await.unwrap();
        assert!(repo.search("knife", 10).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_price() {
        let repo = repo().await;
        let knife = repo
            .insert("Knife Skills 101", None, Money::from_baht(1500))
            .await
            .unwrap();

        repo.update_price(knife.product_id, Money::from_baht(1700))
            .await
            .unwrap();
        assert_eq!(
            repo.get(knife.product_id).await.unwrap().price,
            Money::from_baht(1700)
        );
        assert!(repo.update_price(404, Money::zero()).await.is_err());
    }
}

//! # Package Repository
//!
//! Catalog bundles and their constituent products.
//!
//! ```text
//! packages                         package_products
//! ┌────┬──────────────┬───────┐    ┌────────────┬────────────┬──────────┐
//! │ id │ name         │ price │    │ package_id │ product_id │ position │
//! ├────┼──────────────┼───────┤    ├────────────┼────────────┼──────────┤
//! │ 1  │ Baker Bundle │ 8000  │──► │ 1          │ 4          │ 0        │
//! └────┴──────────────┴───────┘    │ 1          │ 9          │ 1        │
//!                                  └────────────┴────────────┴──────────┘
//! ```
//!
//! Constituents come back with their *current* catalog prices. The package
//! adjustment line in the cart is computed from those, so the bundle still
//! totals `discounted_price` after a course price change.

use atelier_core::validation::{validate_name, validate_price};
use atelier_core::{Money, Package, PackageId, Product, ProductId};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_PACKAGE: &str = r#"
    SELECT package_id, package_name, base_price, discounted_price, note
    FROM packages
"#;

#[derive(Debug, Clone)]
pub struct PackageRepository {
    pool: SqlitePool,
}

impl PackageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PackageRepository { pool }
    }

    /// Creates a package with its constituents in the given order.
    ///
    /// Listing the same product twice fails with `UniqueViolation`.
    pub async fn insert(
        &self,
        name: &str,
        base_price: Money,
        discounted_price: Money,
        note: Option<&str>,
        products: &[ProductId],
    ) -> DbResult<Package> {
        validate_name("package_name", name)?;
        validate_price("base_price", base_price)?;
        validate_price("discounted_price", discounted_price)?;

        debug!(name = %name, constituents = products.len(), "Inserting package");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO packages (package_name, base_price, discounted_price, note)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(name.trim())
        .bind(base_price)
        .bind(discounted_price)
        .bind(note)
        .execute(&mut *tx)
        .await?;
        let package_id = result.last_insert_rowid();

        for (position, product_id) in products.iter().enumerate() {
            sqlx::query(
                "INSERT INTO package_products (package_id, product_id, position) VALUES (?1, ?2, ?3)",
            )
            .bind(package_id)
            .bind(*product_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Package {
            package_id,
            package_name: name.trim().to_string(),
            base_price,
            discounted_price,
            note: note.map(str::to_string),
        })
    }

    pub async fn get(&self, id: PackageId) -> DbResult<Package> {
        let sql = format!("{SELECT_PACKAGE} WHERE package_id = ?1");
        sqlx::query_as::<_, Package>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Package", id))
    }

    /// Constituent products in definition order, at current catalog prices.
    pub async fn constituents(&self, id: PackageId) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT p.product_id, p.product_name, p.category, p.price, p.is_active
            FROM package_products pp
            JOIN products p ON p.product_id = pp.product_id
            WHERE pp.package_id = ?1
            ORDER BY pp.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// The package and its constituents, ready for `Cart::load_package`.
    pub async fn get_with_products(&self, id: PackageId) -> DbResult<(Package, Vec<Product>)> {
        let package = self.get(id).await?;
        let products = self.constituents(id).await?;
        Ok((package, products))
    }

    pub async fn list(&self) -> DbResult<Vec<Package>> {
        let sql = format!("{SELECT_PACKAGE} ORDER BY package_name");
        let packages = sqlx::query_as::<_, Package>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_constituents_keep_definition_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let products = db.products();
        let pastry = products
            .insert("Pastry Lab", Some("course"), Money::from_baht(6000))
            .await
            .unwrap();
        let bread = products
            .insert("Bread Basics", Some("course"), Money::from_baht(4000))
            .await
            .unwrap();

        let bundle = db
            .packages()
            .insert(
                "Baker Bundle",
                Money::from_baht(10_000),
                Money::from_baht(8000),
                None,
                &[bread.product_id, pastry.product_id],
            )
            .await
            .unwrap();

        let (loaded, items) = db.packages().get_with_products(bundle.package_id).await.unwrap();
        assert_eq!(loaded, bundle);
        let names: Vec<_> = items.iter().map(|p| p.product_name.as_str()).collect();
        assert_eq!(names, ["Bread Basics", "Pastry Lab"]);
    }

    #[tokio::test]
    async fn test_duplicate_constituent_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let bread = db
            .products()
            .insert("Bread Basics", None, Money::from_baht(4000))
            .await
            .unwrap();

        let result = db
            .packages()
            .insert(
                "Double Bread",
                Money::from_baht(8000),
                Money::from_baht(7000),
                None,
                &[bread.product_id, bread.product_id],
            )
            .await;

        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
        assert!(db.packages().list().await.unwrap().is_empty());
        assert!(matches!(db.packages().get(1).await, Err(DbError::NotFound { .. })));
    }
}

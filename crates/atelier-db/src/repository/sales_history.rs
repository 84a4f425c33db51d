//! # Sales History Repository
//!
//! The pre-bill reporting table. Older monthly reports read `sales_history`
//! directly, so every checkout still writes one row per bill item here.
//! Rows carry no bill id; the line amount and the bill's note (as
//! `sale_note`) are all that link them back.

use atelier_core::{CartLine, CheckoutPlan, CustomerId, Money, SalesHistoryEntry};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::DbResult;

/// Mirrors one bill line into `sales_history`. Checkout transaction only.
pub(crate) async fn insert_entry(
    conn: &mut SqliteConnection,
    plan: &CheckoutPlan,
    line: &CartLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales_history (
            customer_id, product_id, amount, payment_method, sale_channel,
            sale_note, closed_by_emp_id, sale_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(plan.customer.customer_id)
    .bind(line.product_id)
    .bind(line.line_total())
    .bind(plan.payment_method)
    .bind(plan.sale_channel)
    .bind(&plan.note)
    .bind(plan.seller.emp_id)
    .bind(plan.commit_date())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct SalesHistoryRepository {
    pool: SqlitePool,
}

impl SalesHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalesHistoryRepository { pool }
    }

    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> DbResult<Vec<SalesHistoryEntry>> {
        let entries = sqlx::query_as::<_, SalesHistoryEntry>(
            r#"
            SELECT sale_id, customer_id, product_id, amount, payment_method, sale_channel,
                   sale_note, closed_by_emp_id, sale_date
            FROM sales_history
            WHERE customer_id = ?1
            ORDER BY sale_id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Sum of `amount` for rows dated `from..=to`.
    ///
    /// Amounts are pre-discount line totals, as the old reports expect.
    pub async fn total_amount(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM sales_history WHERE sale_date BETWEEN ?1 AND ?2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_satang(total))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_history")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

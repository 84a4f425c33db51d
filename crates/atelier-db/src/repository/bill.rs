//! # Bill Repository
//!
//! Bill headers, their items, and the daily bill id counter.
//!
//! ## Write Path vs Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WRITE (inside the checkout transaction only)                          │
//! │    allocate_bill_id(conn, date)   bill_sequences upsert → BillId        │
//! │    insert_bill(conn, ...)         one bills row                         │
//! │    insert_item(conn, ...)         one bill_items row per cart line      │
//! │                                                                         │
//! │  READ (BillRepository, any time)                                        │
//! │    get / items / list_for_date / list_for_customer / summary            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bills are never updated or deleted. Refunds live in `refund_requests`.

use atelier_core::{Bill, BillId, BillItem, CartLine, CheckoutPlan, CustomerId, Money, SalesSummary};
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_BILL: &str = r#"
    SELECT bill_id, customer_id, seller_id, total_amount, discount, final_amount,
           payment_method, sale_channel, note, sale_date
    FROM bills
"#;

// =============================================================================
// Checkout Writes
// =============================================================================

/// Allocates the next `B-YYYYMMDD-NNNN` for `date` on the given connection.
///
/// Must run inside the checkout transaction: the counter row is written by
/// the same statement that reads it, so SQLite's write lock serializes
/// concurrent checkouts, and a rollback gives the number back.
///
/// The counter is seeded from (and never falls behind) the highest suffix
/// already present in `bills` for that date, so bills written before the
/// counter existed are never reissued.
///
/// ## Errors
/// `CoreError::BillSequenceExhausted` (as `DbError::Domain`) past 9999.
pub(crate) async fn allocate_bill_id(
    conn: &mut SqliteConnection,
    date: NaiveDate,
) -> DbResult<BillId> {
    let pattern = format!("{}%", BillId::date_prefix(date));

    let last_seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO bill_sequences (bill_date, last_seq)
        VALUES (
            ?1,
            (SELECT COALESCE(MAX(CAST(substr(bill_id, 12, 4) AS INTEGER)), 0)
             FROM bills WHERE bill_id LIKE ?2) + 1
        )
        ON CONFLICT (bill_date) DO UPDATE
            SET last_seq = MAX(bill_sequences.last_seq, excluded.last_seq - 1) + 1
        RETURNING last_seq
        "#,
    )
    .bind(date)
    .bind(pattern)
    .fetch_one(&mut *conn)
    .await?;

    let sequence = u32::try_from(last_seq)
        .map_err(|_| DbError::Internal(format!("bill sequence out of range: {}", last_seq)))?;

    let bill_id = BillId::new(date, sequence)?;
    debug!(bill_id = %bill_id, "Allocated bill id");
    Ok(bill_id)
}

/// Writes the bill header for a plan.
pub(crate) async fn insert_bill(
    conn: &mut SqliteConnection,
    bill_id: BillId,
    plan: &CheckoutPlan,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bills (
            bill_id, customer_id, seller_id, total_amount, discount, final_amount,
            payment_method, sale_channel, note, sale_date
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(bill_id)
    .bind(plan.customer.customer_id)
    .bind(plan.seller.emp_id)
    .bind(plan.subtotal)
    .bind(plan.discount)
    .bind(plan.final_amount)
    .bind(plan.payment_method)
    .bind(plan.sale_channel)
    .bind(&plan.note)
    .bind(plan.sale_date)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Writes one bill item, freezing the line's name and price.
pub(crate) async fn insert_item(
    conn: &mut SqliteConnection,
    bill_id: BillId,
    line: &CartLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bill_items (bill_id, product_id, product_name, qty, unit_price, subtotal)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(bill_id)
    .bind(line.product_id)
    .bind(&line.product_name)
    .bind(line.quantity)
    .bind(line.unit_price)
    .bind(line.line_total())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

/// Read access to committed bills.
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
}

impl BillRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BillRepository { pool }
    }

    pub async fn find(&self, bill_id: BillId) -> DbResult<Option<Bill>> {
        let sql = format!("{SELECT_BILL} WHERE bill_id = ?1");
        let bill = sqlx::query_as::<_, Bill>(&sql)
            .bind(bill_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bill)
    }

    pub async fn get(&self, bill_id: BillId) -> DbResult<Bill> {
        self.find(bill_id)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", bill_id))
    }

    /// Items of a bill in cart order.
    pub async fn items(&self, bill_id: BillId) -> DbResult<Vec<BillItem>> {
        let items = sqlx::query_as::<_, BillItem>(
            r#"
            SELECT item_id, bill_id, product_id, product_name, qty, unit_price, subtotal
            FROM bill_items
            WHERE bill_id = ?1
            ORDER BY item_id
            "#,
        )
        .bind(bill_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Bills committed on `date`, in id order.
    pub async fn list_for_date(&self, date: NaiveDate) -> DbResult<Vec<Bill>> {
        let sql = format!("{SELECT_BILL} WHERE date(sale_date) = ?1 ORDER BY bill_id");
        let bills = sqlx::query_as::<_, Bill>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }

    /// A customer's bills, newest first.
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> DbResult<Vec<Bill>> {
        let sql = format!(
            "{SELECT_BILL} WHERE customer_id = ?1 ORDER BY sale_date DESC, bill_id DESC"
        );
        let bills = sqlx::query_as::<_, Bill>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bills)
    }

    /// Totals for bills dated `from..=to`.
    pub async fn summary(&self, from: NaiveDate, to: NaiveDate) -> DbResult<SalesSummary> {
        debug!(%from, %to, "Summarizing bills");

        let (bill_count, gross, discounts, net): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_amount), 0),
                   COALESCE(SUM(discount), 0),
                   COALESCE(SUM(final_amount), 0)
            FROM bills
            WHERE date(sale_date) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            bill_count,
            gross: Money::from_satang(gross),
            discounts: Money::from_satang(discounts),
            net: Money::from_satang(net),
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use atelier_core::CoreError;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    async fn allocate(db: &Database, date: NaiveDate) -> DbResult<BillId> {
        let mut tx = db.pool().begin().await.unwrap();
        let id = allocate_bill_id(&mut *tx, date).await?;
        tx.commit().await.unwrap();
        Ok(id)
    }

    #[tokio::test]
    async fn test_sequence_per_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(allocate(&db, day(14)).await.unwrap().to_string(), "B-20260214-0001");
        assert_eq!(allocate(&db, day(14)).await.unwrap().to_string(), "B-20260214-0002");
        assert_eq!(allocate(&db, day(15)).await.unwrap().to_string(), "B-20260215-0001");
    }

    #[tokio::test]
    async fn test_rolled_back_allocation_is_reused() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        let first = allocate_bill_id(&mut *tx, day(14)).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(allocate(&db, day(14)).await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_counter_respects_existing_bills() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO employees (emp_id, emp_name) VALUES (1, 'Nan')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO customers (customer_id, full_name) VALUES (1, 'Chai')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query(
            r#"
            INSERT INTO bills (bill_id, customer_id, seller_id, total_amount, discount,
                               final_amount, payment_method, sale_channel, sale_date)
            VALUES ('B-20260214-0041', 1, 1, 100, 0, 100, 'cash', 'walk_in', '2026-02-14 09:00:00')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert_eq!(allocate(&db, day(14)).await.unwrap().sequence(), 42);
    }

    #[tokio::test]
    async fn test_exhausted_day() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO bill_sequences (bill_date, last_seq) VALUES ('2026-02-14', 9999)")
            .execute(db.pool())
            .await
            .unwrap();

        let err = allocate(&db, day(14)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::BillSequenceExhausted { requested: 10_000, .. })
        ));
        // Other days are unaffected
        assert_eq!(allocate(&db, day(15)).await.unwrap().sequence(), 1);
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let summary = db.bills().summary(day(1), day(28)).await.unwrap();
        assert_eq!(summary, SalesSummary::default());
    }
}

//! # Course Credit Repository
//!
//! One row per purchased course seat.
//!
//! ## Credit Lifecycle
//! ```text
//!   checkout ──► available ──check_in──► used
//!                    │
//!                    └── past expiry_date: still "available" in the table,
//!                        but no longer listed by available_for_customer()
//! ```
//!
//! Check-in is a single guarded `UPDATE ... WHERE status = 'available'`, so
//! two front-desk terminals scanning the same credit can't both succeed.

use atelier_core::{BillId, CheckInOutcome, CourseCredit, CreditStatus, CustomerId, NewCourseCredit};
use chrono::{Local, NaiveDate, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const SELECT_CREDIT: &str = r#"
    SELECT credit_id, customer_id, bill_id, product_id, buy_date, expiry_date, status
    FROM course_credits
"#;

/// Writes one available credit. Checkout transaction only.
pub(crate) async fn insert_credit(
    conn: &mut SqliteConnection,
    bill_id: BillId,
    credit: &NewCourseCredit,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO course_credits (customer_id, bill_id, product_id, buy_date, expiry_date, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(credit.customer_id)
    .bind(bill_id)
    .bind(credit.product_id)
    .bind(credit.buy_date)
    .bind(credit.expiry_date)
    .bind(CreditStatus::Available)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    pub async fn get(&self, credit_id: i64) -> DbResult<CourseCredit> {
        let sql = format!("{SELECT_CREDIT} WHERE credit_id = ?1");
        sqlx::query_as::<_, CourseCredit>(&sql)
            .bind(credit_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Course credit", credit_id))
    }

    /// Every credit a customer holds, used or not, oldest first.
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> DbResult<Vec<CourseCredit>> {
        let sql = format!("{SELECT_CREDIT} WHERE customer_id = ?1 ORDER BY credit_id");
        let credits = sqlx::query_as::<_, CourseCredit>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(credits)
    }

    /// Credits a customer can still book with on `today`, soonest expiry first.
    pub async fn available_for_customer(
        &self,
        customer_id: CustomerId,
        today: NaiveDate,
    ) -> DbResult<Vec<CourseCredit>> {
        let sql = format!(
            "{SELECT_CREDIT} WHERE customer_id = ?1 AND status = 'available' AND expiry_date >= ?2 \
             ORDER BY expiry_date, credit_id"
        );
        let credits = sqlx::query_as::<_, CourseCredit>(&sql)
            .bind(customer_id)
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        Ok(credits)
    }

    /// Credits minted by one bill.
    pub async fn list_for_bill(&self, bill_id: BillId) -> DbResult<Vec<CourseCredit>> {
        let sql = format!("{SELECT_CREDIT} WHERE bill_id = ?1 ORDER BY credit_id");
        let credits = sqlx::query_as::<_, CourseCredit>(&sql)
            .bind(bill_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(credits)
    }

    /// Marks a credit used, stamped with the local time.
    pub async fn check_in(&self, credit_id: i64) -> DbResult<CheckInOutcome> {
        self.check_in_at(credit_id, Local::now().naive_local()).await
    }

    /// Marks a credit used at `at`.
    ///
    /// ## Returns
    /// * `CheckedIn` - the credit was available and is now used
    /// * `AlreadyUsed` - nothing changed
    ///
    /// ## Errors
    /// `DbError::NotFound` if no such credit exists.
    pub async fn check_in_at(&self, credit_id: i64, at: NaiveDateTime) -> DbResult<CheckInOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE course_credits
            SET status = ?2, used_at = ?3
            WHERE credit_id = ?1 AND status = ?4
            "#,
        )
        .bind(credit_id)
        .bind(CreditStatus::Used)
        .bind(at)
        .bind(CreditStatus::Available)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            info!(credit_id, "Course credit checked in");
            return Ok(CheckInOutcome::CheckedIn);
        }

        // Nothing updated: either the credit is missing or it was used already.
        let credit = self.get(credit_id).await?;
        debug!(credit_id, status = %credit.status, "Check-in skipped");
        Ok(CheckInOutcome::AlreadyUsed)
    }

    /// When a credit was checked in, if it was.
    pub async fn used_at(&self, credit_id: i64) -> DbResult<Option<NaiveDateTime>> {
        let used_at: Option<Option<NaiveDateTime>> =
            sqlx::query_scalar("SELECT used_at FROM course_credits WHERE credit_id = ?1")
                .bind(credit_id)
                .fetch_optional(&self.pool)
                .await?;

        used_at.ok_or_else(|| DbError::not_found("Course credit", credit_id))
    }
}

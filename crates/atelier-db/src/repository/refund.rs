//! # Refund Request Repository
//!
//! Refunds are requests *about* a bill. Approving one records the decision
//! and nothing else: the bill, its items, its credits and the legacy rows
//! stay exactly as the checkout wrote them.
//!
//! ```text
//!              ┌──approve──► approved
//!   pending ───┤
//!              └──reject───► rejected
//! ```

use atelier_core::validation::validate_name;
use atelier_core::{BillId, CoreError, RefundRequest, RefundStatus};
use chrono::{Local, NaiveDateTime};
use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

const SELECT_REQUEST: &str = r#"
    SELECT request_id, bill_id, reason, status, requested_at, decided_at
    FROM refund_requests
"#;

#[derive(Debug, Clone)]
pub struct RefundRepository {
    pool: SqlitePool,
}

impl RefundRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RefundRepository { pool }
    }

    /// Opens a pending request against an existing bill.
    ///
    /// ## Errors
    /// `DbError::NotFound` if the bill doesn't exist.
    pub async fn request(&self, bill_id: BillId, reason: &str) -> DbResult<RefundRequest> {
        validate_name("reason", reason)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM bills WHERE bill_id = ?1)")
                .bind(bill_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(DbError::not_found("Bill", bill_id));
        }

        let requested_at = Local::now().naive_local();
        let result = sqlx::query(
            r#"
            INSERT INTO refund_requests (bill_id, reason, status, requested_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(bill_id)
        .bind(reason.trim())
        .bind(RefundStatus::Pending)
        .bind(requested_at)
        .execute(&self.pool)
        .await?;

        info!(bill_id = %bill_id, "Refund requested");

        self.get(result.last_insert_rowid()).await
    }

    pub async fn approve(&self, request_id: i64) -> DbResult<RefundRequest> {
        self.decide(request_id, RefundStatus::Approved, Local::now().naive_local())
            .await
    }

    pub async fn reject(&self, request_id: i64) -> DbResult<RefundRequest> {
        self.decide(request_id, RefundStatus::Rejected, Local::now().naive_local())
            .await
    }

    /// Moves a pending request to a final status.
    async fn decide(
        &self,
        request_id: i64,
        status: RefundStatus,
        at: NaiveDateTime,
    ) -> DbResult<RefundRequest> {
        let result = sqlx::query(
            r#"
            UPDATE refund_requests
            SET status = ?2, decided_at = ?3
            WHERE request_id = ?1 AND status = ?4
            "#,
        )
        .bind(request_id)
        .bind(status)
        .bind(at)
        .bind(RefundStatus::Pending)
        .execute(&self.pool)
        .await?;

        let request = self.get(request_id).await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InvalidTransition {
                entity: "refund request".to_string(),
                from: request.status.to_string(),
                to: status.to_string(),
            }
            .into());
        }

        info!(request_id, status = %status, "Refund request decided");
        Ok(request)
    }

    pub async fn get(&self, request_id: i64) -> DbResult<RefundRequest> {
        let sql = format!("{SELECT_REQUEST} WHERE request_id = ?1");
        sqlx::query_as::<_, RefundRequest>(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Refund request", request_id))
    }

    pub async fn list_for_bill(&self, bill_id: BillId) -> DbResult<Vec<RefundRequest>> {
        let sql = format!("{SELECT_REQUEST} WHERE bill_id = ?1 ORDER BY request_id");
        let requests = sqlx::query_as::<_, RefundRequest>(&sql)
            .bind(bill_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }

    /// Requests still waiting for a decision, oldest first.
    pub async fn list_pending(&self) -> DbResult<Vec<RefundRequest>> {
        let sql = format!("{SELECT_REQUEST} WHERE status = ?1 ORDER BY requested_at, request_id");
        let requests = sqlx::query_as::<_, RefundRequest>(&sql)
            .bind(RefundStatus::Pending)
            .fetch_all(&self.pool)
            .await?;

        Ok(requests)
    }
}

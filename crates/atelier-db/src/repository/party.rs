//! # Party Repository
//!
//! Customers and employees. The checkout needs both as whole records (the
//! receipt prints their display names), so callers load them here and pass
//! them into the `CheckoutRequest`.

use atelier_core::validation::{validate_name, validate_search_query};
use atelier_core::{Customer, CustomerId, Employee, EmployeeId};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const SELECT_CUSTOMER: &str = r#"
    SELECT customer_id, full_name, nickname, phone, line_id, assigned_sales_id
    FROM customers
"#;

const SELECT_EMPLOYEE: &str = r#"
    SELECT emp_id, emp_name, emp_nickname, position
    FROM employees
"#;

/// Fields for a new customer. Only `full_name` is required.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub full_name: String,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub line_id: Option<String>,
    pub assigned_sales_id: Option<EmployeeId>,
}

impl NewCustomer {
    pub fn named(full_name: impl Into<String>) -> Self {
        NewCustomer {
            full_name: full_name.into(),
            ..Default::default()
        }
    }
}

/// Repository for customers and employees.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: SqlitePool,
}

impl PartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PartyRepository { pool }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Inserts a customer and returns the stored record.
    pub async fn insert_customer(&self, new: NewCustomer) -> DbResult<Customer> {
        validate_name("full_name", &new.full_name)?;

        debug!(name = %new.full_name, "Inserting customer");

        let full_name = new.full_name.trim().to_string();
        let result = sqlx::query(
            r#"
            INSERT INTO customers (full_name, nickname, phone, line_id, assigned_sales_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&full_name)
        .bind(&new.nickname)
        .bind(&new.phone)
        .bind(&new.line_id)
        .bind(new.assigned_sales_id)
        .execute(&self.pool)
        .await?;

        Ok(Customer {
            customer_id: result.last_insert_rowid(),
            full_name,
            nickname: new.nickname,
            phone: new.phone,
            line_id: new.line_id,
            assigned_sales_id: new.assigned_sales_id,
        })
    }

    pub async fn find_customer(&self, id: CustomerId) -> DbResult<Option<Customer>> {
        let sql = format!("{SELECT_CUSTOMER} WHERE customer_id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get_customer(&self, id: CustomerId) -> DbResult<Customer> {
        self.find_customer(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Searches customers by full name, nickname or phone.
    pub async fn search_customers(&self, query: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let query = validate_search_query(query)?;
        let pattern = format!("%{}%", query);

        let sql = format!(
            "{SELECT_CUSTOMER} WHERE full_name LIKE ?1 OR nickname LIKE ?1 OR phone LIKE ?1 \
             ORDER BY full_name LIMIT ?2"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    // =========================================================================
    // Employees
    // =========================================================================

    /// Inserts an employee and returns the stored record.
    pub async fn insert_employee(
        &self,
        name: &str,
        nickname: Option<&str>,
        position: Option<&str>,
    ) -> DbResult<Employee> {
        validate_name("emp_name", name)?;

        debug!(name = %name, "Inserting employee");

        let result = sqlx::query(
            "INSERT INTO employees (emp_name, emp_nickname, position) VALUES (?1, ?2, ?3)",
        )
        .bind(name.trim())
        .bind(nickname)
        .bind(position)
        .execute(&self.pool)
        .await?;

        Ok(Employee {
            emp_id: result.last_insert_rowid(),
            emp_name: name.trim().to_string(),
            emp_nickname: nickname.map(str::to_string),
            position: position.map(str::to_string),
        })
    }

    pub async fn get_employee(&self, id: EmployeeId) -> DbResult<Employee> {
        let sql = format!("{SELECT_EMPLOYEE} WHERE emp_id = ?1");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    /// All employees, for the seller picker.
    pub async fn list_employees(&self) -> DbResult<Vec<Employee>> {
        let sql = format!("{SELECT_EMPLOYEE} ORDER BY emp_name");
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_customer_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let parties = db.parties();

        let seller = parties
            .insert_employee("Napat Srisuk", Some("Nan"), Some("Sales"))
            .await
            .unwrap();
        let customer = parties
            .insert_customer(NewCustomer {
                full_name: "Somchai Jaidee".to_string(),
                nickname: Some("Chai".to_string()),
                phone: Some("081-234-5678".to_string()),
                assigned_sales_id: Some(seller.emp_id),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(parties.get_customer(customer.customer_id).await.unwrap(), customer);
        assert_eq!(parties.search_customers("chai", 10).await.unwrap().len(), 1);
        assert_eq!(parties.search_customers("5678", 10).await.unwrap().len(), 1);
        assert!(parties.find_customer(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_employees() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let parties = db.parties();

        parties.insert_employee("Warin", None, None).await.unwrap();
        let nan = parties
            .insert_employee("Napat Srisuk", Some("Nan"), None)
            .await
            .unwrap();

        assert_eq!(parties.get_employee(nan.emp_id).await.unwrap().display_name(), "Nan");
        assert_eq!(parties.list_employees().await.unwrap().len(), 2);
        assert!(matches!(
            parties.get_employee(404).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(parties.insert_employee(" ", None, None).await.is_err());
    }
}

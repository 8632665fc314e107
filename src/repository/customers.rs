//! Customers repository for database operations

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        customer::{Customer, CustomerData},
        enums::{CustomerStatus, LoanStatus},
    },
    services::validation,
};

#[derive(Clone)]
pub struct CustomersRepository {
    pool: Pool<Postgres>,
}

impl CustomersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List customers, optionally filtered by (case-insensitive) first name
    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<Customer>> {
        let rows = match name {
            Some(name) => {
                sqlx::query_as::<_, Customer>(
                    "SELECT * FROM customers WHERE lower(name) = lower($1) ORDER BY id",
                )
                .bind(name.trim())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    /// Get customer by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))
    }

    /// Customers born on the given date
    pub async fn get_by_birth_date(&self, birth_date: NaiveDate) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE birth_date = $1 ORDER BY id",
        )
        .bind(birth_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a customer
    pub async fn create(&self, data: &CustomerData, status: CustomerStatus) -> AppResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, lastname, address, city, state, country, birth_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.lastname)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.country)
        .bind(data.birth_date)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(customer)
    }

    /// Replace all fields of a customer except its status
    pub async fn update(&self, id: i64, data: &CustomerData) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $1, lastname = $2, address = $3, city = $4,
                state = $5, country = $6, birth_date = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.lastname)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.country)
        .bind(data.birth_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))
    }

    /// Set the status of a customer
    pub async fn update_status(&self, id: i64, status: CustomerStatus) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>("UPDATE customers SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))
    }

    /// Count the customer's loans that have not been returned
    async fn count_open_loans(conn: &mut PgConnection, id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE customer_id = $1 AND status <> $2",
        )
        .bind(id)
        .bind(LoanStatus::Returned)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Delete a customer whose loans have all been returned; those loans go with them.
    ///
    /// Loan creation share-locks the customer row, so the check and the
    /// delete cannot interleave with a new loan.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i64>("SELECT id FROM customers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))?;

        let open_loans = Self::count_open_loans(&mut tx, id).await?;
        validation::ensure_customer_deletable(id, open_loans)?;

        sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

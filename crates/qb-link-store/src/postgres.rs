//! PostgreSQL storage implementation.
//!
//! Customers live in a single `customers` table; the `UNIQUE` constraint on
//! `display_name` is the uniqueness guarantee, so a violation reported by the
//! server maps to `StoreError::DuplicateDisplayName`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use qb_link_core::{Customer, CustomerId, CustomerUpdate};

use crate::error::{Result, StoreError};
use crate::Store;

/// Maximum pooled connections.
const MAX_CONNECTIONS: u32 = 5;

const SELECT_COLUMNS: &str = "id, display_name, external_customer_id, \
     salary_advance_invoice_id, tip_invoice_id, \
     salary_advance_payment_id, tip_payment_id, created_at, updated_at";

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// A row of the `customers` table.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: String,
    display_name: String,
    external_customer_id: String,
    salary_advance_invoice_id: Option<String>,
    tip_invoice_id: Option<String>,
    salary_advance_payment_id: Option<String>,
    tip_payment_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = StoreError;

    fn try_from(row: CustomerRow) -> Result<Self> {
        let id = row
            .id
            .parse::<CustomerId>()
            .map_err(|e| StoreError::Serialization(format!("customer id {}: {e}", row.id)))?;

        Ok(Self {
            id,
            display_name: row.display_name,
            external_customer_id: row.external_customer_id,
            salary_advance_invoice_id: row.salary_advance_invoice_id,
            tip_invoice_id: row.tip_invoice_id,
            salary_advance_payment_id: row.salary_advance_payment_id,
            tip_payment_id: row.tip_payment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgStore {
    /// Connect to PostgreSQL.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be established.
    pub async fn connect(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM customers WHERE id = $1"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Customer::try_from).transpose()
    }

    async fn find_by_display_name(&self, display_name: &str) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE display_name = $1"
        ))
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Customer>> {
        let rows: Vec<CustomerRow> =
            sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM customers ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Customer::try_from).collect()
    }

    async fn create(&self, display_name: &str, external_customer_id: &str) -> Result<Customer> {
        let customer = Customer::new(display_name, external_customer_id);

        let result = sqlx::query(
            "INSERT INTO customers \
             (id, display_name, external_customer_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(customer.id.to_string())
        .bind(&customer.display_name)
        .bind(&customer.external_customer_id)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(customer),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateDisplayName {
                    display_name: customer.display_name,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: &CustomerId, update: &CustomerUpdate) -> Result<Option<Customer>> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "UPDATE customers SET \
             salary_advance_invoice_id = COALESCE($2, salary_advance_invoice_id), \
             tip_invoice_id = COALESCE($3, tip_invoice_id), \
             salary_advance_payment_id = COALESCE($4, salary_advance_payment_id), \
             tip_payment_id = COALESCE($5, tip_payment_id), \
             updated_at = $6 \
             WHERE id = $1 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(id.to_string())
        .bind(update.salary_advance_invoice_id.as_deref())
        .bind(update.tip_invoice_id.as_deref())
        .bind(update.salary_advance_payment_id.as_deref())
        .bind(update.tip_payment_id.as_deref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }
}

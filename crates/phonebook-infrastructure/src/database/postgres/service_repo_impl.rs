//! PostgreSQL emergency service repository (global table)

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use phonebook_core::error::DomainError;
use phonebook_core::repositories::ServiceRepository;
use phonebook_core::EmergencyService;
use phonebook_shared::constants::SERVICES_SCHEMA;

use super::errors::storage_error;

pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    phone_number: String,
    email: Option<String>,
}

impl From<ServiceRow> for EmergencyService {
    fn from(row: ServiceRow) -> Self {
        EmergencyService {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            email: row.email,
        }
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn list(&self) -> Result<Vec<EmergencyService>, DomainError> {
        let sql = format!(
            "SELECT id, name, phone_number, email FROM \"{}\".\"services\" ORDER BY name COLLATE \"C\", id",
            SERVICES_SCHEMA
        );
        let rows: Vec<ServiceRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("services.list", SERVICES_SCHEMA, e))?;

        Ok(rows.into_iter().map(EmergencyService::from).collect())
    }
}

// ============================================================================
// Phonebook Infrastructure - PostgreSQL Worker Repository
// File: crates/phonebook-infrastructure/src/database/postgres/worker_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use phonebook_core::error::DomainError;
use phonebook_core::repositories::WorkerRepository;
use phonebook_core::services::birthday::MonthDay;
use phonebook_core::services::search::{escape_like, SearchQuery, WorkerFilter, SEARCH_FIELDS};
use phonebook_core::{Partition, Worker, WorkerProfile};

use super::errors::{storage_error, write_error};

/// Everything except the photo; used by listing reads.
pub(crate) const WORKER_COLUMNS: &str = "id, surname, name, middle_name, email, phone_number, \
     cabinet, position, department, section, birth_date, description";

/// Single-record reads and writes return the photo as well.
const WORKER_COLUMNS_WITH_PHOTO: &str = "id, surname, name, middle_name, email, phone_number, \
     cabinet, position, department, section, birth_date, description, photo";

// Code-point order on lowercased names, same as the in-memory store.
const ORDER_BY: &str =
    r#" ORDER BY lower(surname) COLLATE "C", lower(name) COLLATE "C", id"#;

pub struct PgWorkerRepository {
    pool: PgPool,
}

impl PgWorkerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
pub(crate) struct WorkerRow {
    pub id: i64,
    pub surname: String,
    pub name: String,
    pub middle_name: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub cabinet: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub section: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub description: Option<String>,
    #[sqlx(default)]
    pub photo: Option<Vec<u8>>,
}

impl From<WorkerRow> for Worker {
    fn from(row: WorkerRow) -> Self {
        Worker {
            id: row.id,
            profile: WorkerProfile {
                surname: row.surname,
                name: row.name,
                middle_name: row.middle_name,
                email: row.email,
                phone_number: row.phone_number,
                cabinet: row.cabinet,
                position: row.position,
                department: row.department,
                section: row.section,
                birth_date: row.birth_date,
                description: row.description,
                photo: row.photo,
            },
        }
    }
}

/// Single-row insert shared by `create` and the bulk import transaction.
pub(crate) async fn insert_worker<'e, E>(
    executor: E,
    partition: &Partition,
    profile: &WorkerProfile,
) -> Result<Worker, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO {} (
            surname, name, middle_name, email, phone_number,
            cabinet, position, department, section, birth_date,
            description, photo
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {}
        "#,
        partition.qualify("workers"),
        WORKER_COLUMNS_WITH_PHOTO
    );

    let row: WorkerRow = sqlx::query_as(&sql)
        .bind(&profile.surname)
        .bind(&profile.name)
        .bind(&profile.middle_name)
        .bind(&profile.email)
        .bind(&profile.phone_number)
        .bind(&profile.cabinet)
        .bind(&profile.position)
        .bind(&profile.department)
        .bind(&profile.section)
        .bind(profile.birth_date)
        .bind(&profile.description)
        .bind(&profile.photo)
        .fetch_one(executor)
        .await?;

    Ok(row.into())
}

/// Full-row update keyed by the current email; the photo is left alone.
async fn update_worker<'e, E>(
    executor: E,
    partition: &Partition,
    email: &str,
    profile: &WorkerProfile,
) -> Result<Worker, DomainError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        UPDATE {}
        SET surname = $1, name = $2, middle_name = $3, email = $4,
            phone_number = $5, cabinet = $6, position = $7,
            department = $8, section = $9, birth_date = $10,
            description = $11
        WHERE email = $12
        RETURNING {}
        "#,
        partition.qualify("workers"),
        WORKER_COLUMNS_WITH_PHOTO
    );

    let row: Option<WorkerRow> = sqlx::query_as(&sql)
        .bind(&profile.surname)
        .bind(&profile.name)
        .bind(&profile.middle_name)
        .bind(&profile.email)
        .bind(&profile.phone_number)
        .bind(&profile.cabinet)
        .bind(&profile.position)
        .bind(&profile.department)
        .bind(&profile.section)
        .bind(profile.birth_date)
        .bind(&profile.description)
        .bind(email)
        .fetch_optional(executor)
        .await
        .map_err(|e| write_error("workers.update", partition, "worker", &profile.email, e))?;

    row.map(Worker::from)
        .ok_or_else(|| DomainError::not_found("worker", email))
}

fn select_workers(partition: &Partition) -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {} FROM {}", WORKER_COLUMNS, partition.qualify("workers")))
}

/// Appends ` AND department = .. [AND section = ..]`; the caller has
/// already opened the WHERE clause.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &WorkerFilter) {
    if let Some(department) = filter.department() {
        builder.push(" AND department = ").push_bind(department.to_string());
        if let Some(section) = filter.section() {
            builder.push(" AND section = ").push_bind(section.to_string());
        }
    }
}

#[async_trait]
impl WorkerRepository for PgWorkerRepository {
    async fn create(&self, partition: &Partition, profile: &WorkerProfile) -> Result<Worker, DomainError> {
        debug!(tenant = partition.schema(), "workers.create");
        insert_worker(&self.pool, partition, profile)
            .await
            .map_err(|e| write_error("workers.create", partition, "worker", &profile.email, e))
    }

    async fn find_by_email(&self, partition: &Partition, email: &str) -> Result<Worker, DomainError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1",
            WORKER_COLUMNS_WITH_PHOTO,
            partition.qualify("workers")
        );
        let row: Option<WorkerRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("workers.find_by_email", partition.schema(), e))?;

        row.map(Worker::from)
            .ok_or_else(|| DomainError::not_found("worker", email))
    }

    async fn list(&self, partition: &Partition, filter: &WorkerFilter) -> Result<Vec<Worker>, DomainError> {
        let mut builder = select_workers(partition);
        builder.push(" WHERE TRUE");
        push_filter(&mut builder, filter);
        builder.push(ORDER_BY);

        let rows: Vec<WorkerRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("workers.list", partition.schema(), e))?;

        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn update(&self, partition: &Partition, email: &str, profile: &WorkerProfile) -> Result<Worker, DomainError> {
        debug!(tenant = partition.schema(), "workers.update");
        update_worker(&self.pool, partition, email, profile).await
    }

    async fn update_if_unchanged(
        &self,
        partition: &Partition,
        email: &str,
        expected: &WorkerProfile,
        profile: &WorkerProfile,
    ) -> Result<Option<Worker>, DomainError> {
        const OP: &str = "workers.update_if_unchanged";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;

        // row lock held until commit; concurrent writers queue behind it
        let sql = format!(
            "SELECT {} FROM {} WHERE email = $1 FOR UPDATE",
            WORKER_COLUMNS,
            partition.qualify("workers")
        );
        let current: Option<WorkerRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;
        let current = current
            .map(Worker::from)
            .ok_or_else(|| DomainError::not_found("worker", email))?;

        if !current.profile.same_fields(expected) {
            debug!(tenant = partition.schema(), "workers.update skipped, record changed");
            return Ok(None);
        }

        let worker = update_worker(&mut *tx, partition, email, profile).await?;
        tx.commit().await.map_err(|e| storage_error(OP, partition.schema(), e))?;
        Ok(Some(worker))
    }

    async fn delete(&self, partition: &Partition, email: &str) -> Result<(), DomainError> {
        let sql = format!("DELETE FROM {} WHERE email = $1", partition.qualify("workers"));
        let result = sqlx::query(&sql)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("workers.delete", partition.schema(), e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("worker", email));
        }
        Ok(())
    }

    async fn search(&self, partition: &Partition, query: &SearchQuery) -> Result<Vec<Worker>, DomainError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        // (f1 ILIKE $a OR f2 ILIKE $a ...) AND (f1 ILIKE $b OR ...) per token
        let mut builder = select_workers(partition);
        builder.push(" WHERE TRUE");
        for token in query.tokens() {
            let pattern = format!("{}%", escape_like(token));
            builder.push(" AND (");
            for (i, field) in SEARCH_FIELDS.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder
                    .push(*field)
                    .push(" ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\'");
            }
            builder.push(")");
        }
        push_filter(&mut builder, query.filter());
        builder.push(ORDER_BY);

        debug!(tenant = partition.schema(), tokens = query.tokens().len(), "workers.search");
        let rows: Vec<WorkerRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("workers.search", partition.schema(), e))?;

        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn birthdays_on(&self, partition: &Partition, day: MonthDay) -> Result<Vec<Worker>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM {}
            WHERE birth_date IS NOT NULL
              AND EXTRACT(MONTH FROM birth_date)::int = $1
              AND EXTRACT(DAY FROM birth_date)::int = $2
            {}
            "#,
            WORKER_COLUMNS,
            partition.qualify("workers"),
            ORDER_BY
        );
        let rows: Vec<WorkerRow> = sqlx::query_as(&sql)
            .bind(day.month as i32)
            .bind(day.day as i32)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("workers.birthdays", partition.schema(), e))?;

        Ok(rows.into_iter().map(Worker::from).collect())
    }

    async fn find_photo(&self, partition: &Partition, email: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let sql = format!("SELECT photo FROM {} WHERE email = $1", partition.qualify("workers"));
        let row: Option<(Option<Vec<u8>>,)> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("workers.find_photo", partition.schema(), e))?;

        match row {
            Some((photo,)) => Ok(photo),
            None => Err(DomainError::not_found("worker", email)),
        }
    }

    async fn attach_photo(&self, partition: &Partition, email: &str, photo: Vec<u8>) -> Result<(), DomainError> {
        const OP: &str = "workers.attach_photo";
        let sql = format!(
            "UPDATE {} SET photo = $1 WHERE email = $2 AND photo IS NULL",
            partition.qualify("workers")
        );
        let result = sqlx::query(&sql)
            .bind(photo)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;
        if result.rows_affected() > 0 {
            return Ok(());
        }

        // nothing written: either no such worker or a photo is already there
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE email = $1)", partition.qualify("workers"));
        let (exists,): (bool,) = sqlx::query_as(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;
        if exists {
            Err(DomainError::already_exists("photo", email))
        } else {
            Err(DomainError::not_found("worker", email))
        }
    }

    async fn set_photo(&self, partition: &Partition, email: &str, photo: Option<Vec<u8>>) -> Result<(), DomainError> {
        let sql = format!("UPDATE {} SET photo = $1 WHERE email = $2", partition.qualify("workers"));
        let result = sqlx::query(&sql)
            .bind(photo)
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("workers.set_photo", partition.schema(), e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("worker", email));
        }
        Ok(())
    }
}

// ============================================================================
// Phonebook Infrastructure - PostgreSQL Composite Writer
// File: crates/phonebook-infrastructure/src/database/postgres/composite_writer_impl.rs
// ============================================================================
//! Transactions for department upsert-with-sections and bulk import.
//!
//! Each method opens one transaction on one pooled connection and only
//! commits after the last statement succeeds. Any early return (or the
//! future being dropped) drops the `Transaction`, which rolls back.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, warn};

use phonebook_core::error::DomainError;
use phonebook_core::repositories::CompositeWriter;
use phonebook_core::{Department, DepartmentDraft, Partition, Section, WorkerProfile};

use super::errors::{storage_error, write_error};
use super::worker_repo_impl::insert_worker;

pub struct PgCompositeWriter {
    pool: PgPool,
}

impl PgCompositeWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Parent row, then one row per section, in draft order.
async fn insert_department(
    conn: &mut PgConnection,
    op: &'static str,
    partition: &Partition,
    draft: &DepartmentDraft,
) -> Result<Department, DomainError> {
    let sql = format!(
        "INSERT INTO {} (name) VALUES ($1) RETURNING id, name",
        partition.qualify("departments")
    );
    let (id, name): (i64, String) = sqlx::query_as(&sql)
        .bind(&draft.name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| write_error(op, partition, "department", &draft.name, e))?;

    let sql = format!(
        "INSERT INTO {} (name, department_id) VALUES ($1, $2) RETURNING id",
        partition.qualify("sections")
    );
    let mut sections = Vec::with_capacity(draft.sections.len());
    for section in &draft.sections {
        let (section_id,): (i64,) = sqlx::query_as(&sql)
            .bind(section)
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| write_error(op, partition, "section", section, e))?;
        sections.push(Section { id: section_id, name: section.clone(), department_id: id });
    }

    Ok(Department { id, name, sections })
}

#[async_trait]
impl CompositeWriter for PgCompositeWriter {
    async fn create_department(&self, partition: &Partition, draft: &DepartmentDraft) -> Result<Department, DomainError> {
        const OP: &str = "departments.create";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;

        let department = insert_department(&mut tx, OP, partition, draft).await?;

        tx.commit().await.map_err(|e| storage_error(OP, partition.schema(), e))?;
        debug!(tenant = partition.schema(), department = %department.name, "department committed");
        Ok(department)
    }

    async fn replace_department(
        &self,
        partition: &Partition,
        old_name: &str,
        draft: &DepartmentDraft,
    ) -> Result<Department, DomainError> {
        const OP: &str = "departments.replace";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;

        let sql = format!("DELETE FROM {} WHERE name = $1", partition.qualify("departments"));
        let deleted = sqlx::query(&sql)
            .bind(old_name)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;
        if deleted.rows_affected() == 0 {
            return Err(DomainError::not_found("department", old_name));
        }

        let department = insert_department(&mut tx, OP, partition, draft).await?;

        tx.commit().await.map_err(|e| storage_error(OP, partition.schema(), e))?;
        debug!(tenant = partition.schema(), from = old_name, to = %department.name, "department replaced");
        Ok(department)
    }

    async fn import_workers(&self, partition: &Partition, workers: &[WorkerProfile]) -> Result<usize, DomainError> {
        const OP: &str = "workers.import";
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(OP, partition.schema(), e))?;

        for (index, profile) in workers.iter().enumerate() {
            if let Err(e) = insert_worker(&mut *tx, partition, profile).await {
                let position = index + 1;
                warn!(tenant = partition.schema(), position, "import aborted, rolling back");
                return Err(DomainError::ImportAborted {
                    position,
                    email: profile.email.clone(),
                    source: Box::new(write_error(OP, partition, "worker", &profile.email, e)),
                });
            }
        }

        tx.commit().await.map_err(|e| storage_error(OP, partition.schema(), e))?;
        info!(tenant = partition.schema(), count = workers.len(), "import committed");
        Ok(workers.len())
    }
}
